/// `files container` commands: manage object-store containers and their metadata.
use std::io::Write;

use tracing::{debug, info};

use crate::api::{ContainerListOpts, ContainerOpts, ObjectStoreApi, Session};
use crate::cli::OutputCtx;
use crate::cli::args::{
    ContainerCreateArgs, ContainerDeleteArgs, ContainerDeleteMetadataArgs, ContainerListArgs,
    ContainerMetadataArgs, ContainerNameArgs, ContainerUpdateArgs, Positionals,
};
use crate::cli::output::{write_message, write_record, write_records};
use crate::cli::validate::{Arity, check_arg_num, parse_list, parse_metadata, require_flag};
use crate::errors::RackError;

/// Validate positionals and `--name`, then connect.
fn connect<'a>(
    positionals: &Positionals,
    name: Option<&'a str>,
    session: &dyn Session,
    action: &'static str,
) -> Result<(&'a str, Box<dyn ObjectStoreApi>), RackError> {
    check_arg_num(&positionals.args, Arity::Exact(0))?;
    let name = require_flag("name", name)?;
    let client = session.object_store().map_err(RackError::api(action))?;
    Ok((name, client))
}

/// Delete every object in `container`, returning how many were deleted.
fn empty_container(
    client: &dyn ObjectStoreApi,
    container: &str,
    action: &'static str,
) -> Result<usize, RackError> {
    let objects = client
        .list_objects(container)
        .map_err(RackError::api(action))?;
    for object in &objects {
        client
            .delete_object(container, object)
            .map_err(RackError::api(action))?;
        debug!(%container, %object, "deleted object");
    }
    Ok(objects.len())
}

/// Run `rack files container create`.
///
/// # Errors
///
/// Returns `RackError` on bad arguments or API failure.
pub fn create(
    args: &ContainerCreateArgs,
    ctx: &OutputCtx,
    session: &dyn Session,
    out: &mut dyn Write,
) -> Result<(), RackError> {
    const ACTION: &str = "creating container";
    check_arg_num(&args.positionals.args, Arity::Exact(0))?;
    let name = require_flag("name", args.name.as_deref())?;
    let metadata = parse_metadata("metadata", args.metadata.as_deref().unwrap_or_default())?;
    let opts = ContainerOpts {
        read_acl: args.container_read.clone(),
        write_acl: args.container_write.clone(),
        metadata,
        remove_metadata: Vec::new(),
    };

    let client = session.object_store().map_err(RackError::api(ACTION))?;
    client
        .create_container(name, &opts)
        .map_err(RackError::api(ACTION))?;
    info!(%name, "created container");

    write_message(out, &format!("Successfully created container [{name}]"), ctx)?;
    Ok(())
}

/// Run `rack files container list`.
///
/// # Errors
///
/// Returns `RackError` on bad arguments or API failure.
pub fn list(
    args: &ContainerListArgs,
    ctx: &OutputCtx,
    session: &dyn Session,
    out: &mut dyn Write,
) -> Result<(), RackError> {
    const ACTION: &str = "listing containers";
    check_arg_num(&args.positionals.args, Arity::Exact(0))?;
    let opts = ContainerListOpts {
        limit: args.limit,
        marker: args.marker.clone(),
        end_marker: args.end_marker.clone(),
        prefix: args.prefix.clone(),
    };

    let client = session.object_store().map_err(RackError::api(ACTION))?;
    let containers = client
        .list_containers(&opts)
        .map_err(RackError::api(ACTION))?;
    info!(count = containers.len(), "listed containers");

    write_records(out, &containers, ctx)?;
    Ok(())
}

/// Run `rack files container get`.
///
/// # Errors
///
/// Returns `RackError` on bad arguments or API failure.
pub fn get(
    args: &ContainerNameArgs,
    ctx: &OutputCtx,
    session: &dyn Session,
    out: &mut dyn Write,
) -> Result<(), RackError> {
    const ACTION: &str = "retrieving container";
    let (name, client) = connect(&args.positionals, args.name.as_deref(), session, ACTION)?;
    let info = client.get_container(name).map_err(RackError::api(ACTION))?;
    write_record(out, &info, ctx)?;
    Ok(())
}

/// Run `rack files container delete`. With `--purge`, empties it first.
///
/// # Errors
///
/// Returns `RackError` on bad arguments or API failure.
pub fn delete(
    args: &ContainerDeleteArgs,
    ctx: &OutputCtx,
    session: &dyn Session,
    out: &mut dyn Write,
) -> Result<(), RackError> {
    const ACTION: &str = "deleting container";
    let (name, client) = connect(&args.positionals, args.name.as_deref(), session, ACTION)?;
    if args.purge {
        let deleted = empty_container(client.as_ref(), name, ACTION)?;
        info!(%name, deleted, "purged container");
    }
    client
        .delete_container(name)
        .map_err(RackError::api(ACTION))?;
    info!(%name, "deleted container");

    write_message(out, &format!("Successfully deleted container [{name}]"), ctx)?;
    Ok(())
}

/// Run `rack files container update`.
///
/// # Errors
///
/// Returns `RackError` on bad arguments or API failure.
pub fn update(
    args: &ContainerUpdateArgs,
    ctx: &OutputCtx,
    session: &dyn Session,
    out: &mut dyn Write,
) -> Result<(), RackError> {
    const ACTION: &str = "updating container";
    let (name, client) = connect(&args.positionals, args.name.as_deref(), session, ACTION)?;
    let opts = ContainerOpts {
        read_acl: args.container_read.clone(),
        write_acl: args.container_write.clone(),
        ..ContainerOpts::default()
    };
    client
        .update_container(name, &opts)
        .map_err(RackError::api(ACTION))?;

    write_message(out, &format!("Successfully updated container [{name}]"), ctx)?;
    Ok(())
}

/// Run `rack files container empty`.
///
/// # Errors
///
/// Returns `RackError` on bad arguments or API failure.
pub fn empty(
    args: &ContainerNameArgs,
    ctx: &OutputCtx,
    session: &dyn Session,
    out: &mut dyn Write,
) -> Result<(), RackError> {
    const ACTION: &str = "emptying container";
    let (name, client) = connect(&args.positionals, args.name.as_deref(), session, ACTION)?;
    let deleted = empty_container(client.as_ref(), name, ACTION)?;
    info!(%name, deleted, "emptied container");

    write_message(
        out,
        &format!("Finished! Deleted {deleted} objects from container [{name}]"),
        ctx,
    )?;
    Ok(())
}

/// Run `rack files container set-metadata`: the given keys become the
/// container's only metadata.
///
/// # Errors
///
/// Returns `RackError` on bad arguments or API failure.
pub fn set_metadata(
    args: &ContainerMetadataArgs,
    ctx: &OutputCtx,
    session: &dyn Session,
    out: &mut dyn Write,
) -> Result<(), RackError> {
    write_metadata(args, ctx, session, out, true)
}

/// Run `rack files container update-metadata`: the given keys are added or
/// overwritten, others are kept.
///
/// # Errors
///
/// Returns `RackError` on bad arguments or API failure.
pub fn update_metadata(
    args: &ContainerMetadataArgs,
    ctx: &OutputCtx,
    session: &dyn Session,
    out: &mut dyn Write,
) -> Result<(), RackError> {
    write_metadata(args, ctx, session, out, false)
}

fn write_metadata(
    args: &ContainerMetadataArgs,
    ctx: &OutputCtx,
    session: &dyn Session,
    out: &mut dyn Write,
    replace: bool,
) -> Result<(), RackError> {
    let action = if replace {
        "setting container metadata"
    } else {
        "updating container metadata"
    };
    check_arg_num(&args.positionals.args, Arity::Exact(0))?;
    let name = require_flag("name", args.name.as_deref())?;
    let metadata = parse_metadata("metadata", require_flag("metadata", args.metadata.as_deref())?)?;

    let client = session.object_store().map_err(RackError::api(action))?;
    let remove_metadata = if replace {
        let current = client.get_container(name).map_err(RackError::api(action))?;
        current
            .metadata
            .into_keys()
            .filter(|key| !metadata.contains_key(key))
            .collect()
    } else {
        Vec::new()
    };
    let opts = ContainerOpts {
        metadata,
        remove_metadata,
        ..ContainerOpts::default()
    };
    client
        .update_container(name, &opts)
        .map_err(RackError::api(action))?;
    info!(%name, replace, "wrote container metadata");

    let info = client.get_container(name).map_err(RackError::api(action))?;
    write_records(out, &info.metadata_entries(), ctx)?;
    Ok(())
}

/// Run `rack files container get-metadata`.
///
/// # Errors
///
/// Returns `RackError` on bad arguments or API failure.
pub fn get_metadata(
    args: &ContainerNameArgs,
    ctx: &OutputCtx,
    session: &dyn Session,
    out: &mut dyn Write,
) -> Result<(), RackError> {
    const ACTION: &str = "retrieving container metadata";
    let (name, client) = connect(&args.positionals, args.name.as_deref(), session, ACTION)?;
    let info = client.get_container(name).map_err(RackError::api(ACTION))?;
    write_records(out, &info.metadata_entries(), ctx)?;
    Ok(())
}

/// Run `rack files container delete-metadata`.
///
/// # Errors
///
/// Returns `RackError` on bad arguments or API failure.
pub fn delete_metadata(
    args: &ContainerDeleteMetadataArgs,
    ctx: &OutputCtx,
    session: &dyn Session,
    out: &mut dyn Write,
) -> Result<(), RackError> {
    const ACTION: &str = "deleting container metadata";
    check_arg_num(&args.positionals.args, Arity::Exact(0))?;
    let name = require_flag("name", args.name.as_deref())?;
    let keys = parse_list(require_flag("metadata-keys", args.metadata_keys.as_deref())?);

    let client = session.object_store().map_err(RackError::api(ACTION))?;
    let opts = ContainerOpts {
        remove_metadata: keys.clone(),
        ..ContainerOpts::default()
    };
    client
        .update_container(name, &opts)
        .map_err(RackError::api(ACTION))?;

    write_message(
        out,
        &format!(
            "Successfully deleted metadata with keys [{}] from container [{name}]",
            keys.join(", ")
        ),
        ctx,
    )?;
    Ok(())
}
