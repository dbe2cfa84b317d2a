// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! elin - compiler and runner for the ELIN language.
//!
//! `elin build` compiles a source file into a textual instruction image;
//! `elin run` executes a source file or a previously built image.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::debug;
use owo_colors::OwoColorize;

use elin_engine::{Engine, Error, Program, Vm, emitter};

#[derive(Parser)]
#[command(name = "elin", version, about = "Compiler and runner for the ELIN language")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a source file into a textual instruction image
    Build {
        /// ELIN source file
        source: PathBuf,
        /// Output path (defaults to the source path with an `.outz` extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compile a source file, or load an `.outz` image, and execute it
    Run {
        /// ELIN source file or `.outz` image
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Build { source, output } => build(&source, output.as_deref()),
        Command::Run { file } => run(&file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}: {}", "error".red().bold(), error);
            ExitCode::FAILURE
        }
    }
}

fn build(source: &Path, output: Option<&Path>) -> Result<(), Error> {
    let program = Engine::new().compile_file(source)?;

    let out_path = match output {
        Some(path) => path.to_path_buf(),
        None => source.with_extension("outz"),
    };
    let image = emitter::serialize(&program, &package_name(source));
    fs::write(&out_path, image).map_err(|e| Error::Io(e.to_string()))?;

    println!(
        "{} {} -> {}",
        "compiled".green().bold(),
        source.display(),
        out_path.display()
    );
    Ok(())
}

fn run(file: &Path) -> Result<(), Error> {
    let program = load(file)?;
    debug!("executing {} instructions", program.len());
    for value in Vm::new().run(&program)? {
        println!("{value}");
    }
    Ok(())
}

fn load(file: &Path) -> Result<Program, Error> {
    if file.extension().is_some_and(|ext| ext == "outz") {
        let text = fs::read_to_string(file).map_err(|e| Error::Io(e.to_string()))?;
        emitter::parse(&text)
    } else {
        Engine::new().compile_file(file)
    }
}

/// The package name recorded in the image header is the source file stem.
fn package_name(source: &Path) -> String {
    source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "main".to_owned())
}
