use std::io::{Cursor, Write};

use cnablib::formats::cnab400::{self, Cnab400};
use cnablib::traits::ReadFormat;
use cnablib::{CnabError, CnabFile};
use rust_decimal::Decimal;

fn blank_line(kind: char) -> String {
    let mut line = " ".repeat(400);
    line.replace_range(0..1, &kind.to_string());
    line
}

fn put(line: &mut String, start: usize, text: &str) {
    line.replace_range(start..start + text.len(), text);
}

/// A fully populated detail line whose filler regions are spaces, matching
/// what the encoder synthesizes.
fn sample_detail_line() -> String {
    let mut line = blank_line('1');
    put(&mut line, 1, "02");
    put(&mut line, 3, "12345678000123");
    put(&mut line, 20, "00000090368400035");
    put(&mut line, 70, "000000123456");
    put(&mut line, 107, "09");
    put(&mut line, 110, "250625");
    put(&mut line, 116, "DOC42     ");
    put(&mut line, 146, "300625");
    put(&mut line, 152, "0000000036840");
    put(&mut line, 165, "237");
    put(&mut line, 168, "06254");
    put(&mut line, 173, "01");
    put(&mut line, 175, "0000000000250"); // tarifa
    put(&mut line, 188, "0000000000000"); // iof
    put(&mut line, 227, "0000000000000"); // abatimento
    put(&mut line, 240, "0000000000000"); // descontos
    put(&mut line, 253, "0000000036840"); // principal
    put(&mut line, 266, "0000000000000"); // juros
    put(&mut line, 279, "0000000000000"); // outros creditos
    put(&mut line, 295, "010725");
    put(&mut line, 318, "06        ");
    put(&mut line, 394, "000002");
    line
}

fn sample_file_text() -> String {
    let mut header = blank_line('0');
    put(&mut header, 1, "2RETORNO01COBRANCA       ");
    put(&mut header, 26, "00000090368400035   ");
    put(&mut header, 46, "ACME COBRANCAS LTDA           ");
    put(&mut header, 76, "237BRADESCO       ");
    put(&mut header, 94, "250625");
    put(&mut header, 394, "000001");

    let mut trailer = blank_line('9');
    put(&mut trailer, 1, "01");
    put(&mut trailer, 17, "00000001");
    put(&mut trailer, 25, "00000000036840");
    put(&mut trailer, 394, "000003");

    format!("{header}\n{}\n{trailer}\n", sample_detail_line())
}

#[test]
fn parses_three_record_file() {
    let file = Cnab400::read(Cursor::new(sample_file_text())).expect("read cnab");

    let header = file.header.as_ref().expect("header");
    assert_eq!(header.codigo_banco, "237");
    assert_eq!(header.nome_empresa.trim(), "ACME COBRANCAS LTDA");
    assert_eq!(header.data_geracao, "250625");

    assert_eq!(file.details.len(), 1);
    let d = &file.details[0];
    assert_eq!(d.valor_titulo, Decimal::new(36840, 2));
    assert_eq!(d.nosso_numero, "000000123456");
    assert_eq!(d.seu_numero.trim(), "DOC42");
    assert_eq!(d.data_vencimento, "30/06/2025");
    assert_eq!(d.valor_principal, d.valor_titulo);
    // interest decodes as zero regardless of the bytes at 266..279
    assert_eq!(d.juros_mora_multa, Decimal::ZERO);

    let trailer = file.trailer.as_ref().expect("trailer");
    assert_eq!(trailer.qtd_titulos_simples, 1);
    assert_eq!(trailer.valor_total_simples, Decimal::new(36840, 2));

    assert_eq!(file.raw_lines.len(), 3);
    assert_eq!(file.total_principal(), Decimal::new(36840, 2));
}

#[test]
fn short_detail_line_defaults_instead_of_failing() {
    // classified as detail but truncated right after the title value
    let mut line = blank_line('1');
    put(&mut line, 152, "0000000036840");
    line.truncate(165);

    let file = Cnab400::read(Cursor::new(format!("{line}\n"))).expect("read");
    let d = &file.details[0];
    assert_eq!(d.valor_titulo, Decimal::new(36840, 2));
    assert_eq!(d.banco_cobrador, "");
    assert_eq!(d.motivo_ocorrencia, "");
    assert_eq!(d.data_credito, "");
    assert_eq!(d.sequencial, "");
}

#[test]
fn unrecognized_lines_drop_from_model_but_stay_raw() {
    let text = format!("XUNKNOWN\n{}\n", sample_detail_line());
    let file = Cnab400::read(Cursor::new(text)).expect("read");
    assert!(file.header.is_none());
    assert_eq!(file.details.len(), 1);
    assert_eq!(file.raw_lines.len(), 2);
    assert_eq!(file.raw_lines[0], "XUNKNOWN\n");
}

#[test]
fn empty_input_is_an_error() {
    assert!(matches!(
        Cnab400::read(Cursor::new("")),
        Err(CnabError::EmptyFile)
    ));
    assert!(matches!(
        Cnab400::read(Cursor::new("\n   \n")),
        Err(CnabError::EmptyFile)
    ));
}

#[test]
fn read_from_path() {
    let mut tmp = tempfile::NamedTempFile::new().expect("tempfile");
    tmp.write_all(sample_file_text().as_bytes()).expect("write");

    let file = CnabFile::read(tmp.path()).expect("read path");
    assert_eq!(file.detail_count(), 1);

    let summary = file.summary();
    assert_eq!(summary.codigo_banco, "237");
    assert_eq!(summary.data_geracao, "25/06/2025");
    assert_eq!(summary.total_titulos, 1);
    assert_eq!(summary.valor_total, Decimal::new(36840, 2));

    assert!(CnabFile::read("/no/such/file.TXT").is_err());
}

#[test]
fn detail_round_trip_reproduces_the_line() {
    let original = sample_detail_line();
    let file = Cnab400::read(Cursor::new(format!("{original}\n"))).expect("read");
    let encoded =
        cnab400::encode_detail(&file.details[0], 2, false).expect("encode");
    assert_eq!(encoded, original);
}

#[test]
fn synthesized_trailer_sequence_counts_header_and_trailer() {
    let line = cnab400::synthesize_trailer(19, Decimal::new(1_000_00, 2)).expect("trailer");
    assert_eq!(line.len(), 400);
    assert_eq!(&line[0..1], "9");
    assert_eq!(&line[17..25], "00000019");
    assert_eq!(&line[25..39], "00000000100000");
    assert_eq!(&line[394..400], "000021");
}

#[test]
fn synthesized_header_carries_identity() {
    let line = cnab400::synthesize_header("ACME LTDA", "00000000000005725675");
    assert_eq!(line.len(), 400);
    assert_eq!(&line[0..9], "02RETORNO");
    assert_eq!(&line[9..26], "01COBRANCA       ");
    assert_eq!(&line[26..46], "00000000000005725675");
    assert_eq!(&line[46..55], "ACME LTDA");
    assert_eq!(&line[76..79], "237");
    assert_eq!(&line[79..94], "BRADESCO       ");
    assert_eq!(&line[100..108], "01600000");
    assert_eq!(&line[394..400], "000001");
}
