use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use anyhow::Context;
use regex::Regex;
use tracing::{info, warn};
use super::ReportError;

pub const REPORT_EXTENSION: &str = "rpt";
pub const TABLE_COLUMNS: [&str; 5] = ["sz", "ct", "dist", "suffix", "mape"];
pub const MAPE_PATTERN: &str = r"(?m)^Average mape val = \s*(\S+)";

/// One `.rpt` file of the aggregation table
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub path: PathBuf,
    pub fields: BTreeMap<String, String>,
    pub suffix: String,
    pub mape: Option<f64>,
}

impl ReportEntry {
    pub fn field(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or_default()
    }

    fn table_row(&self) -> String {
        let mape = self.mape.map(|v| v.to_string()).unwrap_or_default();
        [self.field("sz"), self.field("ct"), self.field("dist"), self.suffix.as_str(), mape.as_str()].join(",")
    }
}

/// All `.rpt` files below `dir`, sorted by path
pub fn find_reports<P: AsRef<Path>>(dir: P) -> anyhow::Result<Vec<PathBuf>> {
    let mut reports = vec![];
    collect_reports(dir.as_ref(), &mut reports)?;
    reports.sort();
    Ok(reports)
}

fn collect_reports(dir: &Path, reports: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    for entry in std::fs::read_dir(dir).with_context(|| format!("read directory {:?}", dir))? {
        let path = entry?.path();
        if path.is_dir() {
            collect_reports(&path, reports)?;
        } else if path.extension().is_some_and(|ext| ext == REPORT_EXTENSION) {
            reports.push(path);
        }
    }
    Ok(())
}

/// Split `sz_4-ct_A-dist_worst-base.rpt` into key-value fields and the suffix
pub fn parse_report_name(path: &Path) -> Result<(BTreeMap<String, String>, String), ReportError> {
    let malformed = || ReportError::MalformedReportName(path.to_path_buf());
    let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(malformed)?;

    let mut parts: Vec<&str> = stem.split('-').collect();
    let suffix = parts.pop().ok_or_else(malformed)?.to_string();

    let mut fields = BTreeMap::new();
    for pair in parts {
        let (key, value) = pair.split_once('_').ok_or_else(malformed)?;
        fields.insert(key.to_string(), value.to_string());
    }

    Ok((fields, suffix))
}

/// Value of the last line matched by `pattern`, see [`MAPE_PATTERN`]
pub fn read_mape(pattern: &Regex, content: &str) -> Option<f64> {
    pattern.captures_iter(content)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<f64>().ok())
        .last()
}

pub fn read_entry(path: &Path, pattern: &Regex) -> anyhow::Result<ReportEntry> {
    let (fields, suffix) = parse_report_name(path)?;
    let content = std::fs::read_to_string(path).with_context(|| format!("read report {:?}", path))?;
    let mape = read_mape(pattern, &content);
    if mape.is_none() {
        warn!("no mape value found in {:?}", path);
    }
    Ok(ReportEntry { path: path.to_path_buf(), fields, suffix, mape })
}

/// Aggregate every report under `report_dir` into a `sz,ct,dist,suffix,mape` table
pub fn dump_table<P1: AsRef<Path>, P2: AsRef<Path>>(report_dir: P1, output: P2) -> anyhow::Result<Vec<ReportEntry>> {
    let report_dir = report_dir.as_ref();
    let output = output.as_ref();

    let pattern = Regex::new(MAPE_PATTERN)?;
    let entries = find_reports(report_dir)?
        .iter()
        .map(|path| read_entry(path, &pattern))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let file = File::create(output).with_context(|| format!("create table {:?}", output))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{}", TABLE_COLUMNS.join(","))?;
    for entry in entries.iter() {
        writeln!(writer, "{}", entry.table_row())?;
    }
    writer.flush()?;

    info!("write {} reports to {:?}", entries.len(), output);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_report_name() {
        let (fields, suffix) = parse_report_name(Path::new("report/sz_16-ct_B-dist_worst-pvt.rpt")).unwrap();
        assert_eq!(fields["sz"], "16");
        assert_eq!(fields["ct"], "B");
        assert_eq!(fields["dist"], "worst");
        assert_eq!(suffix, "pvt");
    }

    #[test]
    fn test_malformed_report_name() {
        assert!(matches!(
            parse_report_name(Path::new("sz4-ct_A-base.rpt")),
            Err(ReportError::MalformedReportName(_))
        ));
    }

    #[test]
    fn test_read_mape() {
        let pattern = Regex::new(MAPE_PATTERN).unwrap();
        let content = "Trial 0 mape val = 0.5\nAverage mape val = 0.125\n";
        assert_eq!(read_mape(&pattern, content), Some(0.125));
        assert_eq!(read_mape(&pattern, "nothing"), None);
    }

    #[test]
    fn test_mape_pattern_reused_across_reports() {
        let pattern = Regex::new(MAPE_PATTERN).unwrap();
        let rerun = "Average mape val = 0.3\nTrial 0 mape val = 0.2\nAverage mape val = 0.2\n";
        assert_eq!(read_mape(&pattern, rerun), Some(0.2));
        assert_eq!(read_mape(&pattern, "Average mape val = 1e-3\n"), Some(1e-3));
        assert_eq!(read_mape(&pattern, "Average mape val = nan?\n"), None);
    }

    #[test]
    fn test_dump_table() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("sz_4-ct_A-dist_worst-base.rpt"), "Average mape val = 0.02\n").unwrap();
        std::fs::write(nested.join("sz_8-ct_B-dist_worst-res.rpt"), "Average mape val = 0.5\n").unwrap();
        std::fs::write(dir.path().join("sz_8-ct_B-dist_worst-pvt.rpt"), "crashed\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let output = dir.path().join("table.csv");
        let entries = dump_table(dir.path(), &output).unwrap();
        assert_eq!(entries.len(), 3);

        let table = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines[0], "sz,ct,dist,suffix,mape");
        assert!(lines.contains(&"4,A,worst,base,0.02"));
        assert!(lines.contains(&"8,B,worst,res,0.5"));
        assert!(lines.contains(&"8,B,worst,pvt,"));
    }
}
