use crate::error::{ParseError, ParseErrorKind};
use crate::types::{LoadedVariants, ParseSummary, Variant};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Minimum whitespace-delimited fields on a data line; the last one is the info string.
pub const MIN_FIELDS: usize = 15;

/// Info keys every retained line must carry.
pub const REQUIRED_INFO_KEYS: [&str; 5] = ["AF", "AC_Adj", "AC_Hom", "AC_Het", "AN"];

/// Key/value view over a semicolon-delimited info string.
///
/// Keys are matched exactly, so `AC` and `AC_Adj` never shadow each other.
/// The first occurrence of a repeated key wins; flag entries without `=` are dropped.
#[derive(Debug, Default)]
pub struct InfoFields<'a> {
    fields: HashMap<&'a str, &'a str>,
}

impl<'a> InfoFields<'a> {
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.fields.get(key).copied()
    }

    /// First required key missing from this info string, if any.
    pub fn first_missing(&self, keys: &[&'static str]) -> Option<&'static str> {
        keys.iter().copied().find(|k| !self.fields.contains_key(k))
    }
}

pub fn parse_info(info: &str) -> InfoFields<'_> {
    let mut fields = HashMap::new();
    for entry in info.split(';') {
        if let Some((key, value)) = entry.split_once('=') {
            fields.entry(key).or_insert(value);
        }
    }
    InfoFields { fields }
}

/// What happened to one non-comment line.
enum LineOutcome {
    Kept(Variant),
    MissingInfo(&'static str),
    ZeroAlleleNumber,
}

/// Open and parse a results file.
pub fn load_results_file(path: &Path) -> Result<LoadedVariants> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open results file: {}", path.display()))?;
    let loaded = parse_results(BufReader::new(file))
        .with_context(|| format!("Failed to parse results file: {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        variants = loaded.variants.len(),
        skipped = loaded.summary.skipped(),
        "loaded results file"
    );
    Ok(loaded)
}

/// Parse results lines into variants, skipping comments and lines without frequency info.
pub fn parse_results<R: BufRead>(reader: R) -> Result<LoadedVariants, ParseError> {
    let mut variants = Vec::new();
    let mut summary = ParseSummary::default();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx as u64 + 1;
        let line = line.map_err(|e| ParseError {
            line: line_no,
            raw: String::new(),
            kind: ParseErrorKind::Io(e),
        })?;

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with('#') {
            summary.comment_lines += 1;
            continue;
        }
        summary.data_lines += 1;

        let outcome = parse_line(trimmed).map_err(|kind| ParseError {
            line: line_no,
            raw: line.clone(),
            kind,
        })?;

        match outcome {
            LineOutcome::Kept(variant) => {
                if variant.multiallelic {
                    summary.multiallelic += 1;
                }
                variants.push(variant);
            }
            LineOutcome::MissingInfo(key) => {
                tracing::warn!("line {} without freq info ({} missing): {}", line_no, key, info_of(trimmed));
                summary.missing_info += 1;
            }
            LineOutcome::ZeroAlleleNumber => {
                tracing::warn!("line {} has AN=0, allele frequency undefined", line_no);
                summary.zero_allele_number += 1;
            }
        }
    }

    tracing::debug!("{} multiple allele lines were kept", summary.multiallelic);

    Ok(LoadedVariants { variants, summary })
}

fn info_of(line: &str) -> &str {
    line.split_whitespace().last().unwrap_or("")
}

fn parse_line(line: &str) -> Result<LineOutcome, ParseErrorKind> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < MIN_FIELDS {
        return Err(ParseErrorKind::FieldCount {
            expected: MIN_FIELDS,
            found: fields.len(),
        });
    }

    let info = fields[fields.len() - 1];
    let parsed = parse_info(info);
    if let Some(key) = parsed.first_missing(&REQUIRED_INFO_KEYS) {
        return Ok(LineOutcome::MissingInfo(key));
    }

    // Required keys are present past this point
    let field = |key: &'static str| parsed.get(key).unwrap_or_default();

    let multiallelic = field("AF").contains(',');
    let ac_adj = parse_count("AC_Adj", field("AC_Adj"))?;
    let ac_hom = parse_count("AC_Hom", field("AC_Hom"))?;
    let ac_het = parse_count("AC_Het", field("AC_Het"))?;
    let an = parse_count("AN", field("AN"))?;

    if an == 0 {
        return Ok(LineOutcome::ZeroAlleleNumber);
    }

    let rank = fields[0]
        .parse::<f64>()
        .map_err(|source| ParseErrorKind::InvalidFloat { field: "rank", source })?;
    let score = fields[1]
        .parse::<f64>()
        .map_err(|source| ParseErrorKind::InvalidFloat { field: "score", source })?;

    Ok(LineOutcome::Kept(Variant {
        rank,
        score,
        class: fields[2].to_string(),
        gene: fields[3].to_string(),
        transcript: fields[4].to_string(),
        chrom: fields[5].to_string(),
        pos: fields[6].to_string(),
        id: fields[7].to_string(),
        ref_allele: fields[8].to_string(),
        alt_allele: fields[9].to_string(),
        af: 2.0 * ac_adj as f64 / an as f64,
        info: info.to_string(),
        ac_het,
        ac_hom,
        an,
        multiallelic,
    }))
}

/// Parse an allele count; comma lists (one value per alternate allele) use the first entry.
fn parse_count(key: &'static str, value: &str) -> Result<u64, ParseErrorKind> {
    let first = value.split(',').next().unwrap_or(value);
    first
        .trim()
        .parse::<u64>()
        .map_err(|source| ParseErrorKind::InvalidCount {
            key,
            value: value.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    fn line(score: &str, info: &str) -> String {
        format!(
            "1 {} synonymous GENE1 NM_000001 chr1 12345 rs1 A G . . . . {}",
            score, info
        )
    }

    fn parse(text: &str) -> LoadedVariants {
        parse_results(Cursor::new(text.to_string())).unwrap()
    }

    #[test]
    fn test_af_is_derived_not_copied() {
        let text = line("0.5", "AC_Adj=10;AN=100;AC_Hom=1;AC_Het=2;AF=0.2");
        let loaded = parse(&text);
        assert_eq!(loaded.variants.len(), 1);
        let v = &loaded.variants[0];
        assert_relative_eq!(v.af, 0.2, epsilon = 1e-12);
        assert_eq!(v.ac_hom, 1);
        assert_eq!(v.ac_het, 2);
        assert_eq!(v.an, 100);
        assert_relative_eq!(v.score, 0.5);
    }

    #[test]
    fn test_af_ignores_literal_field() {
        let text = line("0.5", "AF=0.9;AC_Adj=5;AN=100;AC_Hom=0;AC_Het=5");
        let loaded = parse(&text);
        assert_relative_eq!(loaded.variants[0].af, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_an_drops_line() {
        let good = line("0.1", "AF=0.1;AC_Adj=5;AN=100;AC_Hom=0;AC_Het=5");
        let bad = line("0.2", "AF=0.1;AC_Adj=5;AC_Hom=0;AC_Het=5");
        let without = parse(&format!("{good}\n{good}\n"));
        let with = parse(&format!("{good}\n{bad}\n{good}\n"));
        assert_eq!(without.variants.len(), 2);
        assert_eq!(with.variants.len(), without.variants.len());
        assert_eq!(with.summary.missing_info, 1);
        assert_eq!(with.summary.data_lines, 3);
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let text = format!(
            "#rank score class\n\n{}\n   # indented comment\n",
            line("0.3", "AF=0.1;AC_Adj=5;AN=100;AC_Hom=0;AC_Het=5")
        );
        let loaded = parse(&text);
        assert_eq!(loaded.variants.len(), 1);
        assert_eq!(loaded.summary.comment_lines, 2);
    }

    #[test]
    fn test_exact_key_matching() {
        // AC must not satisfy AC_Adj, nor AC_Adj satisfy AC_Hom
        let text = line("0.3", "AC=7;AF=0.1;AC_Adj=5;AN=100;AC_Hom=0;AC_Het=5");
        let loaded = parse(&text);
        assert_relative_eq!(loaded.variants[0].af, 0.1, epsilon = 1e-12);

        let missing_adj = line("0.3", "AC=7;AF=0.1;AN=100;AC_Hom=0;AC_Het=5");
        let loaded = parse(&missing_adj);
        assert!(loaded.variants.is_empty());
        assert_eq!(loaded.summary.missing_info, 1);
    }

    #[test]
    fn test_multiallelic_kept_and_counted() {
        let text = line("0.3", "AF=0.1,0.2;AC_Adj=5,3;AN=100;AC_Hom=0,1;AC_Het=5,2");
        let loaded = parse(&text);
        assert_eq!(loaded.variants.len(), 1);
        assert!(loaded.variants[0].multiallelic);
        assert_eq!(loaded.summary.multiallelic, 1);
        assert_relative_eq!(loaded.variants[0].af, 0.1, epsilon = 1e-12);
        assert_eq!(loaded.variants[0].ac_hom, 0);
    }

    #[test]
    fn test_zero_an_skipped() {
        let text = line("0.3", "AF=0;AC_Adj=0;AN=0;AC_Hom=0;AC_Het=0");
        let loaded = parse(&text);
        assert!(loaded.variants.is_empty());
        assert_eq!(loaded.summary.zero_allele_number, 1);
    }

    #[test]
    fn test_short_line_is_fatal() {
        let err = parse_results(Cursor::new("1 0.5 syn GENE AF=0.1\n")).unwrap_err();
        assert_eq!(err.line, 1);
        assert!(matches!(err.kind, ParseErrorKind::FieldCount { found: 5, .. }));
    }

    #[test]
    fn test_bad_score_is_fatal() {
        let text = format!(
            "{}\n{}\n",
            line("0.3", "AF=0.1;AC_Adj=5;AN=100;AC_Hom=0;AC_Het=5"),
            line("high", "AF=0.1;AC_Adj=5;AN=100;AC_Hom=0;AC_Het=5")
        );
        let err = parse_results(Cursor::new(text)).unwrap_err();
        assert_eq!(err.line, 2);
        assert!(matches!(err.kind, ParseErrorKind::InvalidFloat { field: "score", .. }));
    }

    #[test]
    fn test_identifying_fields_pass_through() {
        let loaded = parse(&line("0.3", "AF=0.1;AC_Adj=5;AN=100;AC_Hom=0;AC_Het=5"));
        let v = &loaded.variants[0];
        assert_eq!(v.class, "synonymous");
        assert_eq!(v.gene, "GENE1");
        assert_eq!(v.transcript, "NM_000001");
        assert_eq!(v.chrom, "chr1");
        assert_eq!(v.pos, "12345");
        assert_eq!(v.id, "rs1");
        assert_eq!(v.ref_allele, "A");
        assert_eq!(v.alt_allele, "G");
        assert_eq!(v.info, "AF=0.1;AC_Adj=5;AN=100;AC_Hom=0;AC_Het=5");
    }

    #[test]
    fn test_parse_info_first_occurrence_wins() {
        let info = parse_info("AN=10;FLAG;AN=20;DP=3");
        assert_eq!(info.get("AN"), Some("10"));
        assert_eq!(info.get("FLAG"), None);
        assert_eq!(info.first_missing(&["AN", "DP", "AF"]), Some("AF"));
    }
}
