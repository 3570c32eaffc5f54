//! Domain model: the three record kinds and the in-memory file.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::Result;
use crate::traits::ReadFormat;

/// Structural kind of one physical line, from its first character.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RecordKind {
    Header,
    Detail,
    Trailer,
}

impl RecordKind {
    /// `None` for blank lines and unrecognized leading bytes. Unrecognized
    /// lines never enter the structured model but stay in the raw-line list.
    pub fn classify(line: &str) -> Option<RecordKind> {
        match line.chars().next()? {
            '0' => Some(RecordKind::Header),
            '1' => Some(RecordKind::Detail),
            '9' => Some(RecordKind::Trailer),
            _ => None,
        }
    }
}

/// Header record (kind '0'). Dates stay in their raw DDMMYY form here;
/// display conversion happens at the summary/report layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Header {
    pub codigo_retorno: String,
    pub literal_retorno: String,
    pub codigo_servico: String,
    pub literal_servico: String,
    pub codigo_empresa: String,
    pub nome_empresa: String,
    pub codigo_banco: String,
    pub nome_banco: String,
    pub data_geracao: String,
    pub densidade: String,
    pub numero_aviso_bancario: String,
    pub data_credito: String,
    pub sequencial: String,
    pub linha_original: String,
}

/// Detail record (kind '1'). Currency fields are decimal reais; dates are
/// DD/MM/YYYY display strings (or the raw text when undateable).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Detail {
    pub codigo_inscricao: String,
    pub numero_inscricao: String,
    pub codigo_empresa: String,
    pub nosso_numero: String,
    pub carteira: String,
    pub data_ocorrencia: String,
    pub seu_numero: String,
    pub data_vencimento: String,
    pub valor_titulo: Decimal,
    pub banco_cobrador: String,
    pub agencia_cobradora: String,
    pub especie: String,
    pub valor_tarifa: Decimal,
    pub valor_iof: Decimal,
    pub valor_abatimento: Decimal,
    pub descontos: Decimal,
    pub valor_principal: Decimal,
    pub juros_mora_multa: Decimal,
    pub outros_creditos: Decimal,
    pub data_credito: String,
    pub motivo_ocorrencia: String,
    pub sequencial: String,
    pub linha_original: String,
}

/// Trailer record (kind '9'): four (count, total) pairs per title category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Trailer {
    pub codigo_retorno: String,
    pub tipo_registro_retorno: String,
    pub qtd_titulos_simples: u32,
    pub valor_total_simples: Decimal,
    pub qtd_titulos_vinculado: u32,
    pub valor_total_vinculado: Decimal,
    pub qtd_titulos_caucao: u32,
    pub valor_total_caucao: Decimal,
    pub qtd_titulos_descontado: u32,
    pub valor_total_descontado: Decimal,
    pub sequencial: String,
    pub linha_original: String,
}

/// A replacement value for one schema field in a point edit.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Money(Decimal),
    /// DD/MM/YYYY display form; encoded to DDMMYY on splice.
    Date(String),
}

/// One parsed file: at most one header and trailer, details in file order,
/// plus every raw line verbatim (terminators included) for byte-preserving
/// edits.
#[derive(Debug, Clone, Default)]
pub struct CnabFile {
    pub header: Option<Header>,
    pub details: Vec<Detail>,
    pub trailer: Option<Trailer>,
    pub raw_lines: Vec<String>,
}

impl CnabFile {
    /// Reads and parses a file in one pass. Fails only on I/O errors or a
    /// file with no non-blank lines; malformed record content degrades to
    /// per-field defaults instead.
    pub fn read(path: impl AsRef<Path>) -> Result<CnabFile> {
        let file = File::open(path)?;
        crate::formats::cnab400::Cnab400::read(BufReader::new(file))
    }

    pub fn detail_count(&self) -> usize {
        self.details.len()
    }

    pub fn total_principal(&self) -> Decimal {
        self.details.iter().map(|d| d.valor_principal).sum()
    }

    pub fn summary(&self) -> FileSummary {
        let header = self.header.clone().unwrap_or_default();
        FileSummary {
            codigo_banco: header.codigo_banco.trim().to_string(),
            nome_banco: header.nome_banco.trim().to_string(),
            nome_empresa: header.nome_empresa.trim().to_string(),
            data_geracao: codec::decode_date_ddmmyy(&header.data_geracao),
            data_credito: codec::decode_date_ddmmyy(&header.data_credito),
            total_titulos: self.detail_count(),
            valor_total: self.total_principal(),
        }
    }
}

/// Pure projection over a parsed file, for reporting.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FileSummary {
    pub codigo_banco: String,
    pub nome_banco: String,
    pub nome_empresa: String,
    pub data_geracao: String,
    pub data_credito: String,
    pub total_titulos: usize,
    pub valor_total: Decimal,
}
