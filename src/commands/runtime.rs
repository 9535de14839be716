use std::fs::File;
use std::io;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::error::StoreError;
use crate::services::output::{print_json, print_one, print_plugin_listing};
use crate::services::query::parse_search_filters;
use crate::store::StoreClient;

pub fn handle_runtime_commands(cli: &Cli, client: &StoreClient) -> anyhow::Result<()> {
    match &cli.command {
        Commands::List {
            queryparameters,
            verbose,
        } => {
            let filters = parse_search_filters(queryparameters);
            let page = client.list_plugins(&filters)?;
            let mut records = page.data;
            if *verbose {
                // One parameter walk per record; any failed page aborts the
                // whole command.
                for record in &mut records {
                    let name = record
                        .get("name")
                        .and_then(Value::as_str)
                        .map(str::to_owned);
                    let Some(name) = name else {
                        debug!("record without a name attribute, skipping parameter walk");
                        continue;
                    };
                    let params = client.collect_plugin_parameters(&name)?;
                    record.insert(
                        "parameters".to_string(),
                        Value::Array(params.into_iter().map(Value::Object).collect()),
                    );
                }
            }
            if cli.json {
                print_json(&records)?;
            } else {
                print_plugin_listing(&records, *verbose);
            }
        }
        Commands::Add {
            name,
            dockerimage,
            descriptorfile,
            publicrepo,
        } => {
            let (descriptor, len) = open_descriptor(descriptorfile)?;
            let descriptor_name = descriptor_file_name(descriptorfile);
            let record = client.add_plugin(
                name,
                dockerimage,
                publicrepo,
                descriptor,
                len,
                &descriptor_name,
            )?;
            print_one(cli.json, &record, || format!("added plugin {name}"))?;
        }
        Commands::Modify {
            name,
            dockerimage,
            descriptorfile,
            publicrepo,
            newname,
        } => {
            let (descriptor, len) = open_descriptor(descriptorfile)?;
            let descriptor_name = descriptor_file_name(descriptorfile);
            // Empty rename field means "keep the current name" on the wire.
            let new_name = newname.as_deref().unwrap_or("");
            let record = client.modify_plugin(
                name,
                dockerimage,
                publicrepo,
                descriptor,
                len,
                &descriptor_name,
                new_name,
            )?;
            print_one(cli.json, &record, || format!("modified plugin {name}"))?;
        }
        Commands::Remove { name } => {
            client.remove_plugin(name)?;
            print_one(cli.json, name, || format!("removed plugin {name}"))?;
        }
    }
    Ok(())
}

/// Open the descriptor for binary reading before any request goes out.
/// The handle is scoped to the enclosing operation: the multipart body
/// consumes it and it closes when the call returns, success or failure.
fn open_descriptor(path: &Path) -> Result<(File, u64), StoreError> {
    let file = File::open(path).map_err(|source| StoreError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let meta = file.metadata().map_err(|source| StoreError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    // File::open happily opens a directory on Linux; only regular files
    // can be uploaded.
    if !meta.is_file() {
        return Err(StoreError::FileAccess {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        });
    }
    Ok((file, meta.len()))
}

fn descriptor_file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "descriptor.json".to_string())
}
