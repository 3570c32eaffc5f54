//! Byte-preserving point edits over already-serialized lines.
//!
//! The bank-facing output must stay byte-compatible with the original file
//! everywhere outside the edited field ranges, so edits splice the original
//! bytes instead of re-encoding records. The only permitted change outside
//! an edited range is right-padding a short line up to the nominal width.

use std::collections::BTreeMap;

use crate::codec::{decimal_to_cents, encode_cents, encode_date_to_ddmmyy, encode_fixed_width, Pad};
use crate::error::Result;
use crate::model::{FieldValue, RecordKind};
use crate::schema::{self, FixedLine};

/// Pending field edits, keyed by detail record index (file order), kept
/// apart from the records themselves so parsed data stays pristine.
#[derive(Debug, Clone, Default)]
pub struct ModificationSet {
    edits: BTreeMap<usize, BTreeMap<&'static str, FieldValue>>,
    header_codigo_empresa: Option<String>,
    refresh_trailer_sequence: bool,
}

impl ModificationSet {
    pub fn new() -> ModificationSet {
        ModificationSet::default()
    }

    /// Registers one field edit. Panics on a field name not in the detail
    /// schema: that is a caller bug, not bad input data.
    pub fn set(&mut self, record: usize, field: &str, value: FieldValue) {
        let spec = schema::detail_field(field);
        self.edits.entry(record).or_default().insert(spec.name, value);
    }

    /// Replaces the header's 20-byte company code field on output.
    pub fn set_header_company_code(&mut self, code: impl Into<String>) {
        self.header_codigo_empresa = Some(code.into());
    }

    /// Rewrites the trailer's sequence number to `detail count + 2`.
    pub fn refresh_trailer_sequence(&mut self) {
        self.refresh_trailer_sequence = true;
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
            && self.header_codigo_empresa.is_none()
            && !self.refresh_trailer_sequence
    }

    pub fn altered_records(&self) -> usize {
        self.edits.len()
    }
}

/// Applies the modification set to the original raw lines, returning the
/// new lines. Untouched lines come back byte-identical, terminator and all.
/// `zero_interest` additionally forces thirteen zeros into the
/// interest/fine field of every detail line.
///
/// Panics when an edit addresses a detail index the file does not have.
pub fn apply_point_edits(
    lines: &[String],
    mods: &ModificationSet,
    zero_interest: bool,
) -> Result<Vec<String>> {
    let detail_total = lines
        .iter()
        .filter(|l| is_kind(l, RecordKind::Detail))
        .count();
    if let Some((&index, _)) = mods.edits.iter().next_back() {
        assert!(
            index < detail_total,
            "edit addresses detail record {index}, file has {detail_total}"
        );
    }

    let mut out = Vec::with_capacity(lines.len());
    let mut detail_index = 0usize;

    for raw in lines {
        let (content, terminator) = split_terminator(raw);
        if content.trim().is_empty() {
            out.push(raw.clone());
            continue;
        }

        match RecordKind::classify(content) {
            Some(RecordKind::Header) => {
                if let Some(code) = &mods.header_codigo_empresa {
                    let mut line = FixedLine::from_line(content);
                    line.set(schema::header_field("codigo_empresa"), code);
                    out.push(line.into_string() + terminator);
                } else {
                    out.push(raw.clone());
                }
            }
            Some(RecordKind::Detail) => {
                let fields = mods.edits.get(&detail_index);
                detail_index += 1;
                if fields.is_none() && !zero_interest {
                    out.push(raw.clone());
                    continue;
                }
                let mut line = FixedLine::from_line(content);
                if let Some(fields) = fields {
                    for (name, value) in fields {
                        splice_field(&mut line, name, value)?;
                    }
                }
                if zero_interest {
                    let juros = schema::detail_field("juros_mora_multa");
                    line.set_raw(juros.start, &"0".repeat(juros.width()));
                }
                out.push(line.into_string() + terminator);
            }
            Some(RecordKind::Trailer) if mods.refresh_trailer_sequence => {
                let mut line = FixedLine::from_line(content);
                let seq = schema::trailer_field("sequencial");
                line.set(seq, &(detail_total + 2).to_string());
                out.push(line.into_string() + terminator);
            }
            // Trailer without refresh, and unrecognized kinds: verbatim.
            _ => out.push(raw.clone()),
        }
    }

    Ok(out)
}

fn splice_field(line: &mut FixedLine, name: &'static str, value: &FieldValue) -> Result<()> {
    let spec = schema::detail_field(name);
    match value {
        FieldValue::Text(text) => line.set(spec, text.trim()),
        FieldValue::Money(amount) => {
            line.set_raw(
                spec.start,
                &encode_cents(decimal_to_cents(*amount), spec.width(), spec.name)?,
            );
        }
        FieldValue::Date(display) => {
            let encoded = encode_date_to_ddmmyy(display);
            line.set_raw(spec.start, &encode_fixed_width(&encoded, spec.width(), Pad::LeftZero));
        }
    }
    Ok(())
}

fn is_kind(raw: &str, kind: RecordKind) -> bool {
    let (content, _) = split_terminator(raw);
    !content.trim().is_empty() && RecordKind::classify(content) == Some(kind)
}

/// Splits the trailing line terminator (`\n`, `\r\n`, or none) off a raw
/// line so it can be reattached untouched after the splice.
fn split_terminator(raw: &str) -> (&str, &str) {
    let content = raw.trim_end_matches(['\r', '\n']);
    (content, &raw[content.len()..])
}
