//! CNAB 400 record codec: parsing, full-record encoding and synthesis of
//! default header/trailer lines.
//!
//! Parsing never fails on malformed record content. Encoding fails only when
//! a monetary value does not fit its field width.

use std::io::{BufRead, Write};

use chrono::Local;
use rust_decimal::Decimal;

use crate::codec::{
    cents_to_decimal, decimal_to_cents, decode_currency_cents, decode_date_ddmmyy, encode_cents,
    encode_date_to_ddmmyy, encode_fixed_width, Pad,
};
use crate::error::{CnabError, Result};
use crate::model::{CnabFile, Detail, Header, RecordKind, Trailer};
use crate::schema::{self, FieldSpec, FixedLine};
use crate::traits::{ReadFormat, WriteFormat};

/// Bank identity written into synthesized lines (Bradesco).
pub const DEFAULT_BANK_CODE: &str = "237";
pub const DEFAULT_BANK_NAME: &str = "BRADESCO";
const DEFAULT_COLLECTING_BRANCH: &str = "06254";

/// Company identity used when no reference file supplies one.
pub const DEFAULT_COMPANY_NAME: &str = "TC SECURITIZADORA S.A.";
pub const DEFAULT_COMPANY_CODE: &str = "00000000000005725675";

pub struct Cnab400;

impl ReadFormat for Cnab400 {
    /// Single pass over the input: classify each non-blank line by its first
    /// character and keep every raw line verbatim, terminator included.
    fn read<R: BufRead>(mut r: R) -> Result<CnabFile> {
        let mut text = String::new();
        r.read_to_string(&mut text)?;

        let mut header = None;
        let mut details = Vec::new();
        let mut trailer = None;
        let mut any = false;

        for raw in text.split_inclusive('\n') {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            any = true;
            match RecordKind::classify(line) {
                Some(RecordKind::Header) => header = Some(parse_header(line)),
                Some(RecordKind::Detail) => details.push(parse_detail(line)),
                Some(RecordKind::Trailer) => trailer = Some(parse_trailer(line)),
                // Unrecognized leading byte: dropped from the structured
                // model, still present in raw_lines for passthrough.
                None => {}
            }
        }

        if !any {
            return Err(CnabError::EmptyFile);
        }

        Ok(CnabFile {
            header,
            details,
            trailer,
            raw_lines: text.split_inclusive('\n').map(str::to_string).collect(),
        })
    }
}

impl WriteFormat for Cnab400 {
    /// Writes the raw lines back out byte for byte.
    fn write<W: Write>(mut w: W, file: &CnabFile) -> Result<()> {
        for line in &file.raw_lines {
            w.write_all(line.as_bytes())?;
        }
        Ok(())
    }
}

fn field_text(fields: &[FieldSpec], name: &str, line: &str) -> String {
    fields
        .iter()
        .find(|f| f.name == name)
        .map(|f| f.slice(line).to_string())
        .unwrap_or_default()
}

fn field_money(fields: &[FieldSpec], name: &str, line: &str) -> Decimal {
    match fields.iter().find(|f| f.name == name) {
        Some(f) => cents_to_decimal(decode_currency_cents(f.slice(line), f.width())),
        None => Decimal::ZERO,
    }
}

fn field_date(fields: &[FieldSpec], name: &str, line: &str) -> String {
    decode_date_ddmmyy(&field_text(fields, name, line))
}

fn field_count(fields: &[FieldSpec], name: &str, line: &str) -> u32 {
    field_text(fields, name, line).trim().parse().unwrap_or(0)
}

pub fn parse_header(line: &str) -> Header {
    let t = |name| field_text(schema::HEADER_FIELDS, name, line);
    Header {
        codigo_retorno: t("codigo_retorno"),
        literal_retorno: t("literal_retorno"),
        codigo_servico: t("codigo_servico"),
        literal_servico: t("literal_servico"),
        codigo_empresa: t("codigo_empresa"),
        nome_empresa: t("nome_empresa"),
        codigo_banco: t("codigo_banco"),
        nome_banco: t("nome_banco"),
        // header dates stay raw DDMMYY; display conversion is the
        // summary layer's job
        data_geracao: t("data_geracao"),
        densidade: t("densidade"),
        numero_aviso_bancario: t("numero_aviso_bancario"),
        data_credito: t("data_credito"),
        sequencial: t("sequencial"),
        linha_original: line.to_string(),
    }
}

pub fn parse_detail(line: &str) -> Detail {
    let t = |name| field_text(schema::DETAIL_FIELDS, name, line);
    let m = |name| field_money(schema::DETAIL_FIELDS, name, line);
    let d = |name| field_date(schema::DETAIL_FIELDS, name, line);
    let valor_titulo = m("valor_titulo");
    Detail {
        codigo_inscricao: t("codigo_inscricao"),
        numero_inscricao: t("numero_inscricao"),
        codigo_empresa: t("codigo_empresa"),
        nosso_numero: t("nosso_numero"),
        carteira: t("carteira"),
        data_ocorrencia: d("data_ocorrencia"),
        seu_numero: t("seu_numero"),
        data_vencimento: d("data_vencimento"),
        valor_titulo,
        banco_cobrador: t("banco_cobrador"),
        agencia_cobradora: t("agencia_cobradora"),
        especie: t("especie"),
        valor_tarifa: m("valor_tarifa"),
        valor_iof: m("valor_iof"),
        valor_abatimento: m("valor_abatimento"),
        descontos: m("descontos"),
        // mirrors the title value; bytes 253..266 are not surfaced here
        valor_principal: valor_titulo,
        // decoded as zero on parse; the raw bytes at 266..279 are only
        // touched by the point-edit zeroing pass
        juros_mora_multa: Decimal::ZERO,
        outros_creditos: m("outros_creditos"),
        data_credito: d("data_credito"),
        motivo_ocorrencia: t("motivo_ocorrencia"),
        sequencial: t("sequencial"),
        linha_original: line.to_string(),
    }
}

pub fn parse_trailer(line: &str) -> Trailer {
    let t = |name| field_text(schema::TRAILER_FIELDS, name, line);
    let m = |name| field_money(schema::TRAILER_FIELDS, name, line);
    let c = |name| field_count(schema::TRAILER_FIELDS, name, line);
    Trailer {
        codigo_retorno: t("codigo_retorno"),
        tipo_registro_retorno: t("tipo_registro_retorno"),
        qtd_titulos_simples: c("qtd_titulos_simples"),
        valor_total_simples: m("valor_total_simples"),
        qtd_titulos_vinculado: c("qtd_titulos_vinculado"),
        valor_total_vinculado: m("valor_total_vinculado"),
        qtd_titulos_caucao: c("qtd_titulos_caucao"),
        valor_total_caucao: m("valor_total_caucao"),
        qtd_titulos_descontado: c("qtd_titulos_descontado"),
        valor_total_descontado: m("valor_total_descontado"),
        sequencial: t("sequencial"),
        linha_original: line.to_string(),
    }
}

/// Builds a default header line when no reference file is available.
/// No terminator; sequence number is always "000001".
pub fn synthesize_header(nome_empresa: &str, codigo_empresa: &str) -> String {
    let mut line = FixedLine::blank('0');
    let put = |line: &mut FixedLine, name, value: &str| {
        line.set(schema::header_field(name), value);
    };
    put(&mut line, "codigo_retorno", "2");
    put(&mut line, "literal_retorno", "RETORNO");
    put(&mut line, "codigo_servico", "01");
    put(&mut line, "literal_servico", "COBRANCA");
    put(&mut line, "codigo_empresa", codigo_empresa);
    put(&mut line, "nome_empresa", nome_empresa);
    put(&mut line, "codigo_banco", DEFAULT_BANK_CODE);
    put(&mut line, "nome_banco", DEFAULT_BANK_NAME);
    line.set_raw(
        schema::header_field("data_geracao").start,
        &Local::now().format("%d%m%y").to_string(),
    );
    put(&mut line, "densidade", "01600000");
    line.set_raw(schema::header_field("sequencial").start, "000001");
    line.into_string()
}

/// Builds a default trailer line: title count, total value in cents and the
/// sequence number `count + 2` (header and trailer included).
pub fn synthesize_trailer(count: usize, total: Decimal) -> Result<String> {
    let mut line = FixedLine::blank('9');
    line.set_raw(1, "01");
    line.set_raw(3, DEFAULT_BANK_CODE);
    line.set(schema::trailer_field("qtd_titulos_simples"), &count.to_string());
    line.set_raw(
        25,
        &encode_cents(decimal_to_cents(total), 14, "valor_total_simples")?,
    );
    line.set_raw(
        394,
        &encode_fixed_width(&(count + 2).to_string(), 6, Pad::LeftZero),
    );
    Ok(line.into_string())
}

/// Re-encodes a detail record as a complete 400-character line.
///
/// Blank identity fields fall back to the format's customary defaults;
/// `zero_interest` forces thirteen zeros into the interest/fine field
/// regardless of the record's value. The record's own sequence number wins
/// over `sequencial` when it parses as an integer.
pub fn encode_detail(d: &Detail, sequencial: usize, zero_interest: bool) -> Result<String> {
    let mut line = FixedLine::blank('1');
    let put = |line: &mut FixedLine, name, value: &str| {
        line.set(schema::detail_field(name), value);
    };
    let put_money = |line: &mut FixedLine, name: &'static str, value: Decimal| -> Result<()> {
        let spec = schema::detail_field(name);
        line.set_raw(spec.start, &encode_cents(decimal_to_cents(value), spec.width(), name)?);
        Ok(())
    };

    put(&mut line, "codigo_inscricao", or_default(&d.codigo_inscricao, "02"));
    put(&mut line, "numero_inscricao", &d.numero_inscricao);
    put(&mut line, "codigo_empresa", &d.codigo_empresa);
    if !d.nosso_numero.trim().is_empty() {
        put(&mut line, "nosso_numero", d.nosso_numero.trim());
    }
    put(&mut line, "carteira", or_default(d.carteira.trim(), "09"));
    put(&mut line, "data_ocorrencia", &encode_date_to_ddmmyy(&d.data_ocorrencia));
    put(&mut line, "seu_numero", d.seu_numero.trim());
    put(&mut line, "data_vencimento", &encode_date_to_ddmmyy(&d.data_vencimento));
    put_money(&mut line, "valor_titulo", d.valor_titulo)?;
    put(&mut line, "banco_cobrador", or_default(&d.banco_cobrador, DEFAULT_BANK_CODE));
    put(
        &mut line,
        "agencia_cobradora",
        or_default(&d.agencia_cobradora, DEFAULT_COLLECTING_BRANCH),
    );
    put(&mut line, "especie", or_default(&d.especie, "01"));
    put_money(&mut line, "valor_tarifa", d.valor_tarifa)?;
    put_money(&mut line, "valor_iof", d.valor_iof)?;
    put_money(&mut line, "valor_abatimento", d.valor_abatimento)?;
    put_money(&mut line, "descontos", d.descontos)?;
    put_money(&mut line, "valor_principal", d.valor_principal)?;
    let juros = if zero_interest {
        Decimal::ZERO
    } else {
        d.juros_mora_multa
    };
    put_money(&mut line, "juros_mora_multa", juros)?;
    put_money(&mut line, "outros_creditos", d.outros_creditos)?;
    put(&mut line, "data_credito", &encode_date_to_ddmmyy(&d.data_credito));
    put(&mut line, "motivo_ocorrencia", &d.motivo_ocorrencia);

    let seq = d
        .sequencial
        .trim()
        .parse::<usize>()
        .unwrap_or(sequencial);
    put(&mut line, "sequencial", &seq.to_string());

    Ok(line.into_string())
}

/// Raw substring of a line, empty when the line is too short or the range
/// misses a character boundary.
pub fn slice_or_empty(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("")
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}
