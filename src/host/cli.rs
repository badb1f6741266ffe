use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use log::info;

use crate::common::source::Source;
use crate::construct::grid::GridHandle;
use crate::host::image::ImageGrid;
use crate::Error;

/// Runs a pixelscript program against an image. In the style of `faxt`'s and
/// passerine-aspen's clap-derive CLIs, and standing in for the out-of-scope
/// Flask upload form this language was originally wrapped in.
#[derive(Parser, Debug)]
#[command(name = "pixelscript", about = "Run a per-pixel image filter expression")]
pub struct Cli {
    /// Image to read and filter.
    #[arg(long)]
    pub input: PathBuf,

    /// Where to write the filtered image.
    #[arg(long)]
    pub output: PathBuf,

    /// The program, given inline.
    #[arg(long, conflicts_with = "program_file", required_unless_present = "program_file")]
    pub expr: Option<String>,

    /// The program, read from a file.
    #[arg(long = "program-file", conflicts_with = "expr", required_unless_present = "expr")]
    pub program_file: Option<PathBuf>,

    /// Aborts the program after this many evaluation steps, instead of
    /// running forever on a runaway recursion or loop.
    #[arg(long = "max-steps")]
    pub max_steps: Option<u64>,
}

impl Cli {
    fn program_source(&self) -> Result<Rc<Source>, Error> {
        match (&self.expr, &self.program_file) {
            (Some(expr), None) => Ok(Source::inline(expr.clone())),
            (None, Some(path)) => Ok(Source::read(path)?),
            _ => unreachable!("clap's conflicts_with guarantees exactly one of expr/program_file"),
        }
    }
}

pub fn run(cli: &Cli) -> Result<(), Error> {
    info!("loading {}", cli.input.display());
    let image = ImageGrid::load(&cli.input)?;
    let grid: Rc<RefCell<ImageGrid>> = Rc::new(RefCell::new(image));
    let handle: GridHandle = grid.clone();

    let source = cli.program_source()?;
    info!("running program from {}", source);
    crate::run(source, handle, cli.max_steps)?;

    info!("writing {}", cli.output.display());
    grid.borrow().save(&cli.output)?;
    Ok(())
}
