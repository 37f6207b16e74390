//! Command dispatch and document I/O

use std::fs;
use std::io;
use std::path::Path;

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands, Format, OutputFormat};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::codec::{atoms_to_json, atoms_to_json_pretty, json_to_atoms};
use crate::config::{global_config_path, Settings};
use crate::domain::{depth, find_all_by_type, find_by_id, find_first_by_type, AtomRef, PreOrder};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    settings.install_id_generator();

    match &cli.command {
        Some(Commands::Show { file, from }) => cmd_show(&settings, file, *from),
        Some(Commands::Convert {
            input,
            output,
            from,
            to,
        }) => cmd_convert(&settings, input, output, *from, *to),
        Some(Commands::Find {
            file,
            from,
            id,
            atom_type,
            all,
        }) => cmd_find(&settings, file, *from, id.as_deref(), atom_type.as_deref(), *all),
        Some(Commands::Stats { file, from }) => cmd_stats(&settings, file, *from),
        Some(Commands::Config { command }) => cmd_config(&settings, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

/// Read a document's top-level atoms. Binary collections may contain gaps.
#[instrument(level = "debug", skip(settings))]
pub fn read_document(
    settings: &Settings,
    path: &Path,
    from: Option<Format>,
) -> CliResult<Vec<Option<AtomRef>>> {
    let format = from.unwrap_or_else(|| Format::from_path(path));
    debug!(?format, "reading document");
    match format {
        Format::Json => {
            let text = fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
            Ok(json_to_atoms(&text)?.into_iter().map(Some).collect())
        }
        Format::Binary => {
            let bytes = fs::read(path).map_err(|e| CliError::io(path, e))?;
            Ok(settings.binary_codec().decode_all(&bytes)?)
        }
    }
}

/// Write atoms; JSON output cannot hold gaps, so they are dropped there.
#[instrument(level = "debug", skip(settings, atoms), fields(count = atoms.len()))]
pub fn write_document(
    settings: &Settings,
    path: &Path,
    atoms: &[Option<AtomRef>],
    to: OutputFormat,
) -> CliResult<()> {
    let bytes = match to {
        OutputFormat::Binary => settings.binary_codec().encode_all(atoms.iter().cloned())?,
        OutputFormat::Json | OutputFormat::Pretty => {
            let present = present_atoms(atoms);
            if present.len() != atoms.len() {
                output::warning(&format!(
                    "{} empty slot(s) dropped for JSON output",
                    atoms.len() - present.len()
                ));
            }
            let text = if to == OutputFormat::Pretty {
                atoms_to_json_pretty(&present, settings.json.indent)?
            } else {
                atoms_to_json(&present)?
            };
            text.into_bytes()
        }
    };
    fs::write(path, bytes).map_err(|e| CliError::io(path, e))
}

/// Summary figures over every root's subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentStats {
    pub roots: usize,
    pub gaps: usize,
    pub atoms: usize,
    pub depth: usize,
    pub memory: usize,
}

pub fn document_stats(atoms: &[Option<AtomRef>]) -> DocumentStats {
    let present = present_atoms(atoms);
    DocumentStats {
        roots: present.len(),
        gaps: atoms.len() - present.len(),
        atoms: present.iter().map(|root| PreOrder::new(root).count()).sum(),
        depth: present.iter().map(|root| depth(root)).max().unwrap_or(0),
        memory: present.iter().map(|root| root.memory_usage()).sum(),
    }
}

fn present_atoms(atoms: &[Option<AtomRef>]) -> Vec<AtomRef> {
    atoms.iter().flatten().cloned().collect()
}

#[instrument(level = "debug", skip(settings))]
fn cmd_show(settings: &Settings, file: &Path, from: Option<Format>) -> CliResult<()> {
    for slot in read_document(settings, file, from)? {
        match slot {
            Some(atom) => output::info(&atom.to_tree_string()),
            None => output::warning("empty slot"),
        }
    }
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn cmd_convert(
    settings: &Settings,
    input: &Path,
    target: &Path,
    from: Option<Format>,
    to: Option<OutputFormat>,
) -> CliResult<()> {
    let atoms = read_document(settings, input, from)?;
    let to = to.unwrap_or(match Format::from_path(target) {
        Format::Binary => OutputFormat::Binary,
        Format::Json => OutputFormat::Json,
    });
    write_document(settings, target, &atoms, to)?;
    output::success(&format!("{} -> {}", input.display(), target.display()));
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn cmd_find(
    settings: &Settings,
    file: &Path,
    from: Option<Format>,
    id: Option<&str>,
    atom_type: Option<&str>,
    all: bool,
) -> CliResult<()> {
    let roots = present_atoms(&read_document(settings, file, from)?);

    let matches: Vec<AtomRef> = match (id, atom_type) {
        (Some(id), _) => roots
            .iter()
            .find_map(|root| find_by_id(root, id))
            .into_iter()
            .collect(),
        (None, Some(atom_type)) if all => roots
            .iter()
            .flat_map(|root| find_all_by_type(root, atom_type))
            .collect(),
        (None, Some(atom_type)) => roots
            .iter()
            .find_map(|root| find_first_by_type(root, atom_type))
            .into_iter()
            .collect(),
        (None, None) => {
            return Err(CliError::InvalidArgs(
                "either --id or --type is required".to_string(),
            ))
        }
    };

    if matches.is_empty() {
        output::warning("no matching atom");
    }
    for atom in matches {
        output::info(&atom);
    }
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn cmd_stats(settings: &Settings, file: &Path, from: Option<Format>) -> CliResult<()> {
    let stats = document_stats(&read_document(settings, file, from)?);
    output::header(&file.display());
    output::field("roots", &stats.roots);
    if stats.gaps > 0 {
        output::field("gaps", &stats.gaps);
    }
    output::field("atoms", &stats.atoms);
    output::field("depth", &stats.depth);
    output::field("memory (approx. bytes)", &stats.memory);
    Ok(())
}

fn cmd_config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::field("global", &path.display()),
            None => output::warning("no config directory on this platform"),
        },
    }
    Ok(())
}
