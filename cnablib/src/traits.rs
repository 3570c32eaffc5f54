//! Read/write seams over std::io::{BufRead, Write}.

use crate::{error::Result, model::CnabFile};
use std::io::{BufRead, Write};

pub trait ReadFormat {
    fn read<R: BufRead>(r: R) -> Result<CnabFile>;
}

pub trait WriteFormat {
    fn write<W: Write>(w: W, file: &CnabFile) -> Result<()>;
}

pub trait Format: ReadFormat + WriteFormat {}
impl<T: ReadFormat + WriteFormat> Format for T {}
