use cnablib::{apply_point_edits, CnabFile, ModificationSet};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Usage: strip_interest RETORNO.TXT RETORNO_SEM_JUROS.TXT
    let mut args = std::env::args().skip(1);
    let (Some(input), Some(output)) = (args.next(), args.next()) else {
        return Err("usage: strip_interest <input> <output>".into());
    };

    let file = CnabFile::read(&input)?;
    let lines = apply_point_edits(&file.raw_lines, &ModificationSet::new(), true)?;
    std::fs::write(&output, lines.concat())?;

    println!(
        "{} titulo(s), R$ {:.2}, juros/multa zerados",
        file.detail_count(),
        file.total_principal()
    );
    Ok(())
}
