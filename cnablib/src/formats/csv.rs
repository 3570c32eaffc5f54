//! Flat-row CSV bridge: one row per detail record, verbatim line dropped.
//!
//! This is the spreadsheet-facing surface. Row money columns accept the
//! Brazilian currency shapes (`"R$ 1.234,56"`, `"1234,56"`, `"1234.56"`)
//! and dates the DD/MM/YYYY display form, matching what the record model
//! itself exposes.

use csv::{ReaderBuilder, WriterBuilder};
use rust_decimal::Decimal;
use std::io::{BufRead, Write};

use crate::codec::{cents_to_decimal, currency_to_cents};
use crate::error::{CnabError, Result};
use crate::formats::cnab400::{
    self, encode_detail, synthesize_header, synthesize_trailer, DEFAULT_COMPANY_CODE,
    DEFAULT_COMPANY_NAME,
};
use crate::model::{CnabFile, Detail};
use crate::schema;

#[derive(serde::Deserialize)]
struct CsvRow {
    #[serde(default)]
    codigo_inscricao: Option<String>,
    #[serde(default)]
    numero_inscricao: Option<String>,
    #[serde(default)]
    codigo_empresa: Option<String>,
    nosso_numero: String,
    #[serde(default)]
    carteira: Option<String>,
    #[serde(default)]
    data_ocorrencia: Option<String>,
    #[serde(default)]
    seu_numero: Option<String>,
    #[serde(default)]
    data_vencimento: Option<String>,
    valor_titulo: String,
    #[serde(default)]
    banco_cobrador: Option<String>,
    #[serde(default)]
    agencia_cobradora: Option<String>,
    #[serde(default)]
    especie: Option<String>,
    #[serde(default)]
    valor_tarifa: Option<String>,
    #[serde(default)]
    valor_iof: Option<String>,
    #[serde(default)]
    valor_abatimento: Option<String>,
    #[serde(default)]
    descontos: Option<String>,
    #[serde(default)]
    valor_principal: Option<String>,
    #[serde(default)]
    juros_mora_multa: Option<String>,
    #[serde(default)]
    outros_creditos: Option<String>,
    #[serde(default)]
    data_credito: Option<String>,
    #[serde(default)]
    motivo_ocorrencia: Option<String>,
    #[serde(default)]
    sequencial: Option<String>,
}

/// Flat export row: every schema-known detail field, verbatim line dropped.
#[derive(serde::Serialize)]
pub struct DetailRow<'a> {
    pub codigo_inscricao: &'a str,
    pub numero_inscricao: &'a str,
    pub codigo_empresa: &'a str,
    pub nosso_numero: &'a str,
    pub carteira: &'a str,
    pub data_ocorrencia: &'a str,
    pub seu_numero: &'a str,
    pub data_vencimento: &'a str,
    #[serde(with = "rust_decimal::serde::str")]
    pub valor_titulo: Decimal,
    pub banco_cobrador: &'a str,
    pub agencia_cobradora: &'a str,
    pub especie: &'a str,
    #[serde(with = "rust_decimal::serde::str")]
    pub valor_tarifa: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub valor_iof: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub valor_abatimento: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub descontos: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub valor_principal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub juros_mora_multa: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub outros_creditos: Decimal,
    pub data_credito: &'a str,
    pub motivo_ocorrencia: &'a str,
    pub sequencial: &'a str,
}

impl<'a> From<&'a Detail> for DetailRow<'a> {
    fn from(d: &'a Detail) -> DetailRow<'a> {
        DetailRow {
            codigo_inscricao: &d.codigo_inscricao,
            numero_inscricao: &d.numero_inscricao,
            codigo_empresa: &d.codigo_empresa,
            nosso_numero: &d.nosso_numero,
            carteira: &d.carteira,
            data_ocorrencia: &d.data_ocorrencia,
            seu_numero: &d.seu_numero,
            data_vencimento: &d.data_vencimento,
            valor_titulo: d.valor_titulo,
            banco_cobrador: &d.banco_cobrador,
            agencia_cobradora: &d.agencia_cobradora,
            especie: &d.especie,
            valor_tarifa: d.valor_tarifa,
            valor_iof: d.valor_iof,
            valor_abatimento: d.valor_abatimento,
            descontos: d.descontos,
            valor_principal: d.valor_principal,
            juros_mora_multa: d.juros_mora_multa,
            outros_creditos: d.outros_creditos,
            data_credito: &d.data_credito,
            motivo_ocorrencia: &d.motivo_ocorrencia,
            sequencial: &d.sequencial,
        }
    }
}

/// Flat row projection of every detail record.
pub fn export_rows(file: &CnabFile) -> Vec<DetailRow<'_>> {
    file.details.iter().map(DetailRow::from).collect()
}

/// Encodes one imported row as a complete 400-character detail line.
pub fn encode_detail_from_row(row: &Detail, sequencial: usize) -> Result<String> {
    encode_detail(row, sequencial, false)
}

pub struct Csv;

impl Csv {
    /// Writes one flat row per detail record, verbatim line dropped.
    pub fn write_rows<W: Write>(mut w: W, file: &CnabFile) -> Result<()> {
        let mut wrt = WriterBuilder::new().from_writer(&mut w);
        for row in export_rows(file) {
            wrt.serialize(row)?;
        }
        wrt.flush()?;
        Ok(())
    }

    /// Reads flat rows back into detail records. `nosso_numero` and
    /// `valor_titulo` columns are mandatory; everything else defaults.
    pub fn read_rows<R: BufRead>(r: R) -> Result<Vec<Detail>> {
        let mut rdr = ReaderBuilder::new().flexible(true).from_reader(r);

        let headers = rdr.headers()?.clone();
        for required in ["nosso_numero", "valor_titulo"] {
            if !headers.iter().any(|h| h == required) {
                return Err(CnabError::Parse(format!("missing column: {required}")));
            }
        }

        let mut details = Vec::new();
        for rec in rdr.deserialize::<CsvRow>() {
            let row = rec?;
            details.push(row_to_detail(row));
        }
        Ok(details)
    }
}

fn money(raw: &Option<String>) -> Decimal {
    cents_to_decimal(currency_to_cents(raw.as_deref().unwrap_or_default()))
}

fn text(raw: Option<String>) -> String {
    raw.unwrap_or_default()
}

fn row_to_detail(row: CsvRow) -> Detail {
    let valor_titulo = cents_to_decimal(currency_to_cents(&row.valor_titulo));
    // paid value falls back to the title value, like every return the bank
    // emits without a partial payment
    let valor_principal = match &row.valor_principal {
        Some(raw) if !raw.trim().is_empty() => cents_to_decimal(currency_to_cents(raw)),
        _ => valor_titulo,
    };
    Detail {
        codigo_inscricao: text(row.codigo_inscricao),
        numero_inscricao: text(row.numero_inscricao),
        codigo_empresa: text(row.codigo_empresa),
        nosso_numero: row.nosso_numero,
        carteira: text(row.carteira),
        data_ocorrencia: text(row.data_ocorrencia),
        seu_numero: text(row.seu_numero),
        data_vencimento: text(row.data_vencimento),
        valor_titulo,
        banco_cobrador: text(row.banco_cobrador),
        agencia_cobradora: text(row.agencia_cobradora),
        especie: text(row.especie),
        valor_tarifa: money(&row.valor_tarifa),
        valor_iof: money(&row.valor_iof),
        valor_abatimento: money(&row.valor_abatimento),
        descontos: money(&row.descontos),
        valor_principal,
        juros_mora_multa: money(&row.juros_mora_multa),
        outros_creditos: money(&row.outros_creditos),
        data_credito: text(row.data_credito),
        motivo_ocorrencia: text(row.motivo_ocorrencia),
        sequencial: text(row.sequencial),
        linha_original: String::new(),
    }
}

/// Assembles a complete CNAB file from detail records.
///
/// `reference` supplies the header and trailer lines verbatim when given,
/// plus CNPJ and company-code defaults lifted from its first detail line;
/// otherwise both are synthesized. Detail sequence numbers run from 2 and
/// a reference trailer gets only its sequence field rewritten.
pub fn rows_to_cnab(details: &[Detail], reference: Option<&CnabFile>) -> Result<Vec<String>> {
    let context = ReferenceContext::from(reference);

    let mut lines = Vec::with_capacity(details.len() + 2);
    match &context.header_line {
        Some(line) => lines.push(with_newline(line)),
        None => lines.push(synthesize_header(DEFAULT_COMPANY_NAME, DEFAULT_COMPANY_CODE) + "\n"),
    }

    let mut total = Decimal::ZERO;
    for (i, detail) in details.iter().enumerate() {
        let mut detail = detail.clone();
        if detail.numero_inscricao.trim().is_empty() {
            detail.numero_inscricao = context.cnpj.clone();
        }
        if detail.codigo_empresa.trim().is_empty() {
            detail.codigo_empresa = context.codigo_empresa.clone();
        }
        total += detail.valor_titulo;
        lines.push(encode_detail(&detail, i + 2, false)? + "\n");
    }

    let final_seq = details.len() + 2;
    match &context.trailer_line {
        Some(line) => {
            let mut trailer = schema::FixedLine::from_line(line.trim_end_matches(['\r', '\n']));
            trailer.set(schema::trailer_field("sequencial"), &final_seq.to_string());
            lines.push(trailer.into_string() + "\n");
        }
        None => lines.push(synthesize_trailer(details.len(), total)? + "\n"),
    }

    Ok(lines)
}

struct ReferenceContext {
    header_line: Option<String>,
    trailer_line: Option<String>,
    cnpj: String,
    codigo_empresa: String,
}

impl ReferenceContext {
    fn from(reference: Option<&CnabFile>) -> ReferenceContext {
        let mut context = ReferenceContext {
            header_line: None,
            trailer_line: None,
            cnpj: "12345678000123".to_string(),
            codigo_empresa: "00000090368400035".to_string(),
        };
        let Some(file) = reference else {
            return context;
        };
        // first and last raw lines verbatim, so reserved regions the schema
        // does not model survive untouched
        context.header_line = file.raw_lines.first().cloned();
        if file.raw_lines.len() > 1 {
            context.trailer_line = file.raw_lines.last().cloned();
        }
        if let Some(first) = file.details.first() {
            let line = &first.linha_original;
            let cnpj = cnab400::slice_or_empty(line, 3, 17);
            let codigo = cnab400::slice_or_empty(line, 20, 37);
            if !cnpj.trim().is_empty() {
                context.cnpj = cnpj.to_string();
            }
            if !codigo.trim().is_empty() {
                context.codigo_empresa = codigo.to_string();
            }
        }
        context
    }
}

fn with_newline(line: &str) -> String {
    if line.ends_with('\n') {
        line.to_string()
    } else {
        format!("{line}\n")
    }
}
