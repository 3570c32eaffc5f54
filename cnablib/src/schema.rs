//! Static byte-offset tables for the three CNAB 400 record kinds.
//!
//! Offsets are 0-indexed half-open ranges over a nominal 400-character line.
//! Lines shorter than a field's end offset decode to the field's default
//! instead of failing.

use crate::codec::Pad;

/// Nominal width of one physical record, excluding the line terminator.
pub const LINE_WIDTH: usize = 400;

/// Semantic type of a field, driving codec choice and defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Cents,
    DateDdmmyy,
    Count,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub start: usize,
    pub end: usize,
    pub kind: FieldKind,
    pub pad: Pad,
}

impl FieldSpec {
    pub const fn width(&self) -> usize {
        self.end - self.start
    }

    /// Raw field text, or the schema default when the line is too short
    /// (or the range does not fall on character boundaries).
    pub fn slice<'a>(&self, line: &'a str) -> &'a str {
        match line.get(self.start..self.end) {
            Some(raw) => raw,
            None => match self.kind {
                FieldKind::Count => "0",
                _ => "",
            },
        }
    }
}

const fn text(name: &'static str, start: usize, end: usize) -> FieldSpec {
    FieldSpec {
        name,
        start,
        end,
        kind: FieldKind::Text,
        pad: Pad::RightSpace,
    }
}

const fn numeric(name: &'static str, start: usize, end: usize, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        start,
        end,
        kind,
        pad: Pad::LeftZero,
    }
}

pub const HEADER_FIELDS: &[FieldSpec] = &[
    text("codigo_retorno", 1, 2),
    text("literal_retorno", 2, 9),
    text("codigo_servico", 9, 11),
    text("literal_servico", 11, 26),
    text("codigo_empresa", 26, 46),
    text("nome_empresa", 46, 76),
    text("codigo_banco", 76, 79),
    text("nome_banco", 79, 94),
    numeric("data_geracao", 94, 100, FieldKind::DateDdmmyy),
    text("densidade", 100, 108),
    text("numero_aviso_bancario", 108, 113),
    numeric("data_credito", 379, 385, FieldKind::DateDdmmyy),
    numeric("sequencial", 394, 400, FieldKind::Text),
];

pub const DETAIL_FIELDS: &[FieldSpec] = &[
    numeric("codigo_inscricao", 1, 3, FieldKind::Text),
    text("numero_inscricao", 3, 17),
    text("codigo_empresa", 20, 37),
    numeric("nosso_numero", 70, 82, FieldKind::Text),
    numeric("carteira", 107, 109, FieldKind::Text),
    numeric("data_ocorrencia", 110, 116, FieldKind::DateDdmmyy),
    text("seu_numero", 116, 126),
    numeric("data_vencimento", 146, 152, FieldKind::DateDdmmyy),
    numeric("valor_titulo", 152, 165, FieldKind::Cents),
    text("banco_cobrador", 165, 168),
    text("agencia_cobradora", 168, 173),
    text("especie", 173, 175),
    numeric("valor_tarifa", 175, 188, FieldKind::Cents),
    numeric("valor_iof", 188, 201, FieldKind::Cents),
    numeric("valor_abatimento", 227, 240, FieldKind::Cents),
    numeric("descontos", 240, 253, FieldKind::Cents),
    numeric("valor_principal", 253, 266, FieldKind::Cents),
    numeric("juros_mora_multa", 266, 279, FieldKind::Cents),
    numeric("outros_creditos", 279, 292, FieldKind::Cents),
    numeric("data_credito", 295, 301, FieldKind::DateDdmmyy),
    text("motivo_ocorrencia", 318, 328),
    numeric("sequencial", 394, 400, FieldKind::Text),
];

pub const TRAILER_FIELDS: &[FieldSpec] = &[
    text("codigo_retorno", 1, 2),
    text("tipo_registro_retorno", 2, 4),
    numeric("qtd_titulos_simples", 17, 25, FieldKind::Count),
    numeric("valor_total_simples", 25, 39, FieldKind::Cents),
    numeric("qtd_titulos_vinculado", 39, 47, FieldKind::Count),
    numeric("valor_total_vinculado", 47, 61, FieldKind::Cents),
    numeric("qtd_titulos_caucao", 61, 69, FieldKind::Count),
    numeric("valor_total_caucao", 69, 83, FieldKind::Cents),
    numeric("qtd_titulos_descontado", 83, 91, FieldKind::Count),
    numeric("valor_total_descontado", 91, 105, FieldKind::Cents),
    numeric("sequencial", 394, 400, FieldKind::Text),
];

/// A mutable 400-column line under construction or point edit. Splices are
/// char-addressed so schema offsets line up with what the bank counts.
#[derive(Debug, Clone)]
pub struct FixedLine {
    chars: Vec<char>,
}

impl FixedLine {
    /// Blank line of spaces with the record-kind discriminant in column 1.
    pub fn blank(kind: char) -> FixedLine {
        let mut chars = vec![' '; LINE_WIDTH];
        chars[0] = kind;
        FixedLine { chars }
    }

    /// Existing line content, right-padded with spaces up to the nominal
    /// width when shorter. Content beyond the nominal width is kept.
    pub fn from_line(line: &str) -> FixedLine {
        let mut chars: Vec<char> = line.chars().collect();
        if chars.len() < LINE_WIDTH {
            chars.resize(LINE_WIDTH, ' ');
        }
        FixedLine { chars }
    }

    /// Writes `value` into the field's byte range, applying its pad rule.
    /// Every character outside the range is left untouched.
    pub fn set(&mut self, spec: &FieldSpec, value: &str) {
        let encoded = crate::codec::encode_fixed_width(value, spec.width(), spec.pad);
        self.set_raw(spec.start, &encoded);
    }

    /// Writes pre-encoded text at an exact offset, no padding applied.
    pub fn set_raw(&mut self, start: usize, text: &str) {
        for (i, c) in text.chars().enumerate() {
            self.chars[start + i] = c;
        }
    }

    pub fn into_string(self) -> String {
        self.chars.into_iter().collect()
    }
}

/// Looks up a field by name in one kind's table. An unknown name is a
/// caller bug, hence the panic.
pub fn field_in(fields: &'static [FieldSpec], name: &str) -> &'static FieldSpec {
    fields
        .iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("unknown schema field: {name}"))
}

pub fn detail_field(name: &str) -> &'static FieldSpec {
    field_in(DETAIL_FIELDS, name)
}

pub fn header_field(name: &str) -> &'static FieldSpec {
    field_in(HEADER_FIELDS, name)
}

pub fn trailer_field(name: &str) -> &'static FieldSpec {
    field_in(TRAILER_FIELDS, name)
}
