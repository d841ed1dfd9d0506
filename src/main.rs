mod dump;

use std::{
    fs::File,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use jdump_class_file::{AttributePolicy, ClassFile, ParseOptions, MAX_NESTING_DEPTH};
use memmap::Mmap;

use crate::dump::Dump;

#[derive(Parser)]
#[command(name = "jdump", about = "Dump the structure of JVM class files")]
struct Cli {
    /// Reject known attributes found where the format does not allow them
    #[arg(long)]
    strict: bool,

    /// Maximum annotation and attribute nesting depth
    #[arg(
        long,
        value_name = "N",
        default_value_t = 64,
        value_parser = clap::value_parser!(u32).range(0..=MAX_NESTING_DEPTH as i64)
    )]
    max_depth: u32,

    /// Print class names with `.` instead of `/`
    #[arg(long)]
    dotted: bool,

    /// Keep attributes nested in Code as raw bytes
    #[arg(long)]
    no_code_attributes: bool,

    /// Class files to dump
    #[arg(value_name = "CLASS_FILE", required = true)]
    files: Vec<PathBuf>,
}
impl Cli {
    fn parse_options(&self) -> ParseOptions {
        let attribute_policy = if self.strict {
            AttributePolicy::Strict
        } else {
            AttributePolicy::Permissive
        };

        ParseOptions::default()
            .attribute_policy(attribute_policy)
            .max_nesting_depth(self.max_depth as usize)
            .decode_code_attributes(!self.no_code_attributes)
    }
}

fn main() -> ExitCode {
    pretty_env_logger::init();

    let cli = Cli::parse();
    let options = cli.parse_options();

    let mut failed = false;
    for (i, path) in cli.files.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("Class file: {}", path.display());

        match dump_file(path, &options, cli.dotted) {
            Ok(dump) => print!("{}", dump),
            Err(e) => {
                log::error!("{}: {}", path.display(), e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn dump_file(
    path: &Path,
    options: &ParseOptions,
    dotted: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    // Zero-length files cannot be mapped.
    if file.metadata()?.len() == 0 {
        let class_file = ClassFile::parse_with(&[], options.clone())?;
        return Ok(Dump::new(&class_file, dotted).to_string());
    }

    let mmap = unsafe { Mmap::map(&file)? };
    let class_file = ClassFile::parse_with(&mmap, options.clone())?;
    log::debug!(
        "{}: {} methods, {} fields",
        path.display(),
        class_file.methods.len(),
        class_file.fields.len()
    );

    Ok(Dump::new(&class_file, dotted).to_string())
}
