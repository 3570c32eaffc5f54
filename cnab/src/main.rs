use clap::{Parser, Subcommand};
use cnablib::formats::csv::{rows_to_cnab, Csv};
use cnablib::{apply_point_edits, CnabFile, ModificationSet, Result};
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cnab", version, about = "CNAB 400 (Bradesco) return file tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a summary of a return file
    Report { input: PathBuf },

    /// Export detail records as CSV rows
    Export {
        input: PathBuf,
        /// Output file (stdout by default)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Byte-preserving copy with interest/fine zeroed in every detail line
    StripInterest { input: PathBuf, output: PathBuf },

    /// Build a CNAB file from CSV rows
    Build {
        input: PathBuf,
        output: PathBuf,
        /// Existing CNAB file supplying header, trailer and company identity
        #[arg(long)]
        reference: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Command::Report { input } => {
            let file = CnabFile::read(input)?;
            let summary = file.summary();
            println!("Banco: {} - {}", summary.codigo_banco, summary.nome_banco);
            println!("Empresa: {}", summary.nome_empresa);
            println!("Data de geracao: {}", summary.data_geracao);
            if !summary.data_credito.is_empty() {
                println!("Data de credito: {}", summary.data_credito);
            }
            println!("Total de titulos: {}", summary.total_titulos);
            println!("Valor total: R$ {:.2}", summary.valor_total);
            Ok(())
        }
        Command::Export { input, output } => {
            let file = CnabFile::read(input)?;
            let mut writer: Box<dyn Write> = match output {
                Some(path) => Box::new(File::create(path)?),
                None => Box::new(io::stdout()),
            };
            Csv::write_rows(&mut writer, &file)?;
            writer.flush().map_err(Into::into)
        }
        Command::StripInterest { input, output } => {
            let file = CnabFile::read(input)?;
            let lines = apply_point_edits(&file.raw_lines, &ModificationSet::new(), true)?;
            fs::write(output, lines.concat())?;
            println!("Juros/multa zerados em {} registro(s)", file.detail_count());
            Ok(())
        }
        Command::Build {
            input,
            output,
            reference,
        } => {
            let rows = Csv::read_rows(BufReader::new(File::open(input)?))?;
            let reference = reference.map(CnabFile::read).transpose()?;
            let lines = rows_to_cnab(&rows, reference.as_ref())?;
            fs::write(output, lines.concat())?;
            println!("{} registro(s) gerados", rows.len());
            Ok(())
        }
    }
}
