use std::path::PathBuf;
use clap::Parser;
use pimcharz::{
    config::{ArrayArgs, ArrayConfig, CellType, Distribution},
    sweep::{Sweep, SweepArgs, SweepBuilder, Variant},
};

#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    args: ArrayArgs,
}

#[derive(Parser)]
struct SweepCli {
    #[command(flatten)]
    args: SweepArgs,
}

#[test]
fn base_configs_per_cell_type() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("config");

    let sweep = SweepBuilder::default()
        .config_dir(config_dir.clone())
        .run_root(dir.path().join("run"))
        .report_root(dir.path().join("report"))
        .sizes(vec![4, 8])
        .cell_types(vec![CellType::A, CellType::B])
        .dists(vec![Distribution::Worst])
        .variants(vec![Variant::Base])
        .build()
        .unwrap();
    sweep.generate().unwrap();

    let mut files: Vec<PathBuf> = std::fs::read_dir(&config_dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    files.sort();
    assert_eq!(files.len(), 4);

    for file in files {
        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
        let name = file.file_stem().unwrap().to_str().unwrap();
        assert!(name.ends_with("-dist_worst-base"));

        match json["cell_type"].as_str().unwrap() {
            "A" => {
                assert_eq!(json["vi_min"], 0.0);
                assert_eq!(json["vi_max"], 0.15);
                assert_eq!(json["irbl_unit"], 12.6757e-6);
            }
            "B" => {
                assert_eq!(json["vi_min"], 0.45);
                assert_eq!(json["vi_max"], 0.65);
                assert_eq!(json["irbl_unit"], 18.7875e-6);
            }
            other => panic!("unexpected cell type {other}"),
        }
        assert_eq!(json["num_row"], json["num_col"]);
        assert_eq!(json["extra_args"].as_str().unwrap(), file.to_str().unwrap());
    }
}

#[test]
fn generated_config_feeds_run() {
    let dir = tempfile::tempdir().unwrap();
    let sweep = SweepBuilder::default()
        .config_dir(dir.path().join("config"))
        .run_root(dir.path().join("run"))
        .report_root(dir.path().join("report"))
        .sizes(vec![8])
        .cell_types(vec![CellType::B])
        .variants(vec![Variant::Pvt])
        .build()
        .unwrap();
    let configs = sweep.generate().unwrap();

    let extra_args = configs[0].extra_args.display().to_string();
    let args = Cli::parse_from(["pimcharz", "--extra_args", extra_args.as_str()]).args;
    let config = ArrayConfig::load(args).unwrap();

    assert_eq!(config.cell_type, CellType::B);
    assert_eq!(config.num_row, 8);
    assert_eq!(config.num_col, 8);
    assert_eq!(config.vi_min, 0.45);
    assert_eq!(config.irbl_unit, 18.7875e-6);
    assert_eq!(config.res_sl, 1.25);
    assert_eq!(config.res_bl, 2.5);
    assert_eq!(config.tech_file, PathBuf::from("tech/45nm_HP_mc.pm"));
    assert_eq!(config.run_dir, dir.path().join("run/sz_8-ct_B-dist_worst-pvt"));
    assert_eq!(config.report, Some(dir.path().join("report/sz_8-ct_B-dist_worst-pvt.rpt")));
}

#[test]
fn unknown_distribution_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("config");
    let config_arg = config_dir.display().to_string();

    let parsed = SweepCli::try_parse_from(["sweep", "--config_dir", config_arg.as_str(), "--dists", "worst,gaussian"]);
    assert!(parsed.is_err());
    assert!(!config_dir.exists());

    let args = SweepCli::parse_from(["sweep", "--config_dir", config_arg.as_str(), "--sizes", "4", "--dists", "uniform"]).args;
    let configs = Sweep::try_from(args).unwrap().generate().unwrap();
    assert_eq!(configs.len(), 2 * 3);
    assert!(configs.iter().all(|c| c.vi_dist == Distribution::Uniform && c.vw_dist == Distribution::Uniform));
    assert!(config_dir.join("sz_4-ct_A-dist_uniform-base.json").is_file());
}
