use std::io::Cursor;

use cnablib::formats::cnab400::Cnab400;
use cnablib::formats::csv::{encode_detail_from_row, export_rows, rows_to_cnab, Csv};
use cnablib::traits::ReadFormat;
use cnablib::CnabError;
use rust_decimal::Decimal;

fn blank_line(kind: char) -> String {
    let mut line = " ".repeat(400);
    line.replace_range(0..1, &kind.to_string());
    line
}

fn put(line: &mut String, start: usize, text: &str) {
    line.replace_range(start..start + text.len(), text);
}

fn sample_file_text() -> String {
    let mut header = blank_line('0');
    put(&mut header, 1, "2RETORNO");
    put(&mut header, 76, "237");
    let mut detail = blank_line('1');
    put(&mut detail, 3, "98765432000198");
    put(&mut detail, 20, "00000090368400035");
    put(&mut detail, 70, "000000123456");
    put(&mut detail, 146, "300625");
    put(&mut detail, 152, "0000000036840");
    put(&mut detail, 394, "000002");
    let trailer = blank_line('9');
    format!("{header}\n{detail}\n{trailer}\n")
}

#[test]
fn export_then_import_round_trips_the_rows() {
    let file = Cnab400::read(Cursor::new(sample_file_text())).expect("read");

    let mut out = Vec::new();
    Csv::write_rows(&mut out, &file).expect("write rows");
    let text = String::from_utf8(out).expect("utf8");
    assert!(text.starts_with("codigo_inscricao,"));
    assert!(!text.contains("linha_original"));

    let rows = Csv::read_rows(Cursor::new(text.as_bytes())).expect("read rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].nosso_numero, "000000123456");
    assert_eq!(rows[0].valor_titulo, Decimal::new(36840, 2));
    assert_eq!(rows[0].data_vencimento, "30/06/2025");
}

#[test]
fn export_rows_projects_every_detail() {
    let file = Cnab400::read(Cursor::new(sample_file_text())).expect("read");
    let rows = export_rows(&file);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].valor_titulo, Decimal::new(36840, 2));
}

#[test]
fn missing_required_column_is_an_error() {
    let text = "seu_numero,valor_titulo\nA,10\n";
    let err = Csv::read_rows(Cursor::new(text)).unwrap_err();
    assert!(matches!(err, CnabError::Parse(_)));
}

#[test]
fn imported_rows_accept_brazilian_currency() {
    let text = "nosso_numero,valor_titulo,juros_mora_multa\n12345,\"R$ 1.234,56\",\"10,00\"\n";
    let rows = Csv::read_rows(Cursor::new(text)).expect("read rows");
    assert_eq!(rows[0].valor_titulo, Decimal::new(123456, 2));
    assert_eq!(rows[0].juros_mora_multa, Decimal::new(1000, 2));
    // no explicit paid value: defaults to the title value
    assert_eq!(rows[0].valor_principal, Decimal::new(123456, 2));
}

#[test]
fn builds_a_complete_file_without_reference() {
    let text = "nosso_numero,valor_titulo,data_vencimento\n12345,\"368,40\",31/12/2026\n";
    let rows = Csv::read_rows(Cursor::new(text)).expect("read rows");
    let lines = rows_to_cnab(&rows, None).expect("build");

    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|l| l.len() == 401 && l.ends_with('\n')));
    assert!(lines[0].starts_with('0'));
    assert_eq!(&lines[1][0..1], "1");
    assert_eq!(&lines[1][70..82], "000000012345");
    assert_eq!(&lines[1][146..152], "311226");
    assert_eq!(&lines[1][152..165], "0000000036840");
    assert_eq!(&lines[1][394..400], "000002");
    assert!(lines[2].starts_with('9'));
    assert_eq!(&lines[2][17..25], "00000001");
    assert_eq!(&lines[2][25..39], "00000000036840");
    assert_eq!(&lines[2][394..400], "000003");

    // the output must itself parse
    let rebuilt = Cnab400::read(Cursor::new(lines.concat())).expect("reparse");
    assert_eq!(rebuilt.details.len(), 1);
    assert_eq!(rebuilt.details[0].valor_titulo, Decimal::new(36840, 2));
}

#[test]
fn reference_file_supplies_header_trailer_and_identity() {
    let reference = Cnab400::read(Cursor::new(sample_file_text())).expect("read ref");
    let text = "nosso_numero,valor_titulo\n777,\"100,00\"\n";
    let rows = Csv::read_rows(Cursor::new(text)).expect("read rows");

    let lines = rows_to_cnab(&rows, Some(&reference)).expect("build");
    assert_eq!(lines.len(), 3);
    // header verbatim from the reference
    assert_eq!(&lines[0][76..79], "237");
    assert_eq!(&lines[0][1..8], "2RETORN");
    // identity lifted from the reference's first detail line
    assert_eq!(&lines[1][3..17], "98765432000198");
    assert_eq!(&lines[1][20..37], "00000090368400035");
    // reference trailer with only the sequence rewritten
    assert_eq!(&lines[2][394..400], "000003");
    assert_eq!(&lines[2][1..394], &blank_line('9')[1..394]);
}

#[test]
fn encode_detail_from_row_produces_a_full_line() {
    let text = "nosso_numero,valor_titulo\n12345,\"368,40\"\n";
    let rows = Csv::read_rows(Cursor::new(text)).expect("read rows");
    let line = encode_detail_from_row(&rows[0], 2).expect("encode");
    assert_eq!(line.len(), 400);
    assert_eq!(&line[152..165], "0000000036840");
}
