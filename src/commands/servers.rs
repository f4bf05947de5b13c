/// `servers` commands: list and inspect compute servers.
use std::io::Write;

use tracing::info;

use crate::api::{ServerListOpts, Session, extract_server, extract_servers};
use crate::cli::OutputCtx;
use crate::cli::args::{ServerGetArgs, ServerListArgs};
use crate::cli::output::{write_record, write_records};
use crate::cli::validate::{Arity, check_arg_num, require_flag};
use crate::errors::RackError;

impl From<&ServerListArgs> for ServerListOpts {
    fn from(args: &ServerListArgs) -> Self {
        Self {
            changes_since: args.changes_since.clone(),
            image: args.image.clone(),
            flavor: args.flavor.clone(),
            name: args.name.clone(),
            status: args.status.clone(),
            marker: args.marker.clone(),
            limit: args.limit,
        }
    }
}

/// Run `rack servers list`.
///
/// # Errors
///
/// Returns `RackError::InvalidArgs` if positional arguments were given, or
/// `RackError::Api` if the listing fails or does not decode into servers.
pub fn list(
    args: &ServerListArgs,
    ctx: &OutputCtx,
    session: &dyn Session,
    out: &mut dyn Write,
) -> Result<(), RackError> {
    const ACTION: &str = "listing servers";
    check_arg_num(&args.positionals.args, Arity::Exact(0))?;

    let opts = ServerListOpts::from(args);
    let client = session.compute().map_err(RackError::api(ACTION))?;
    let pages = client.list_servers(&opts).map_err(RackError::api(ACTION))?;
    let servers = extract_servers(&pages).map_err(RackError::api(ACTION))?;
    info!(count = servers.len(), pages = pages.len(), "listed servers");

    write_records(out, &servers, ctx)?;
    Ok(())
}

/// Run `rack servers get`.
///
/// # Errors
///
/// Returns `RackError` if `--id` is missing, positional arguments were given,
/// or the lookup fails.
pub fn get(
    args: &ServerGetArgs,
    ctx: &OutputCtx,
    session: &dyn Session,
    out: &mut dyn Write,
) -> Result<(), RackError> {
    const ACTION: &str = "retrieving server";
    check_arg_num(&args.positionals.args, Arity::Exact(0))?;
    let id = require_flag("id", args.id.as_deref())?;

    let client = session.compute().map_err(RackError::api(ACTION))?;
    let body = client.get_server(id).map_err(RackError::api(ACTION))?;
    let server = extract_server(body).map_err(RackError::api(ACTION))?;
    info!(%id, "retrieved server");

    write_record(out, &server, ctx)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::testing::{FakeCloud, run};

    fn page(ids: &[&str]) -> serde_json::Value {
        let servers: Vec<_> = ids
            .iter()
            .map(|id| json!({"id": id, "name": format!("web-{id}"), "status": "ACTIVE",
                             "flavor": {"id": "5", "name": "big"}}))
            .collect();
        json!({ "servers": servers })
    }

    #[test]
    fn test_list_without_flags_uses_default_opts() {
        let cloud = FakeCloud::default();
        cloud.state_mut().server_pages = vec![page(&["a", "b"]), page(&["c"])];

        let (result, stdout) = run(&cloud, &["servers", "list"]);
        result.unwrap();
        assert_eq!(stdout.lines().count(), 4);
        assert!(stdout.lines().nth(1).unwrap().starts_with("a\t"));

        let state = cloud.state();
        assert_eq!(state.server_queries, [crate::api::ServerListOpts::default()]);
        assert_eq!(state.connects, 1);
    }

    #[test]
    fn test_list_passes_filters() {
        let cloud = FakeCloud::default();
        cloud.state_mut().server_pages = vec![page(&[])];

        let (result, _) = run(
            &cloud,
            &[
                "servers",
                "list",
                "--status",
                "ACTIVE",
                "--limit",
                "2",
                "--changes-since",
                "2015-01-01",
            ],
        );
        result.unwrap();
        let query = &cloud.state().server_queries[0];
        assert_eq!(query.status.as_deref(), Some("ACTIVE"));
        assert_eq!(query.limit, Some(2));
        assert_eq!(query.changes_since.as_deref(), Some("2015-01-01"));
    }

    #[test]
    fn test_list_rejects_positional_before_connecting() {
        let cloud = FakeCloud::default();
        let (result, stdout) = run(&cloud, &["servers", "list", "web-1"]);
        let err = result.unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(stdout.is_empty());
        assert_eq!(cloud.state().connects, 0);
        assert!(cloud.state().server_queries.is_empty());
    }

    #[test]
    fn test_list_api_failure_is_wrapped() {
        let cloud = FakeCloud::default();
        cloud.state_mut().fail_status = Some(503);
        let (result, _) = run(&cloud, &["servers", "list"]);
        let err = result.unwrap_err();
        assert!(err.to_string().starts_with("Error listing servers: "));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_list_type_mismatch() {
        let cloud = FakeCloud::default();
        cloud.state_mut().server_pages = vec![json!({"flavors": []})];
        let (result, _) = run(&cloud, &["servers", "list"]);
        let err = result.unwrap_err();
        assert_eq!(err.code(), "unexpected_shape");
    }

    #[test]
    fn test_list_json_output() {
        let cloud = FakeCloud::default();
        cloud.state_mut().server_pages = vec![page(&["a"])];
        let (result, stdout) = run(&cloud, &["servers", "list", "--json"]);
        result.unwrap();
        let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
        assert_eq!(value[0]["flavor"]["name"], "big");
    }

    #[test]
    fn test_list_unknown_fields_is_an_argument_error() {
        let cloud = FakeCloud::default();
        cloud.state_mut().server_pages = vec![page(&["a"])];
        let (result, stdout) = run(&cloud, &["servers", "list", "--fields", "nope"]);
        let err = result.unwrap_err();
        assert_eq!(err.code(), "invalid_args");
        assert_eq!(err.exit_code(), 1);
        assert!(stdout.is_empty());

        let (result, stdout) = run(&cloud, &["servers", "get", "--id", "a", "--fields", "nope"]);
        assert_eq!(result.unwrap_err().code(), "invalid_args");
        assert!(stdout.is_empty());
    }

    #[test]
    fn test_get_requires_id() {
        let cloud = FakeCloud::default();
        let (result, _) = run(&cloud, &["servers", "get"]);
        assert_eq!(result.unwrap_err().to_string(), "missing required flag --id");
        assert_eq!(cloud.state().connects, 0);
    }

    #[test]
    fn test_get_property_view() {
        let cloud = FakeCloud::default();
        cloud.state_mut().server_pages = vec![page(&["a", "b"])];
        let (result, stdout) = run(&cloud, &["servers", "get", "--id", "b", "--fields", "name"]);
        result.unwrap();
        let lines: Vec<&str> = stdout.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "Name\t\tweb-b");
    }

    #[test]
    fn test_get_unknown_server() {
        let cloud = FakeCloud::default();
        let (result, _) = run(&cloud, &["servers", "get", "--id", "zzz"]);
        let err = result.unwrap_err();
        assert_eq!(err.code(), "not_found");
        assert!(err.to_string().starts_with("Error retrieving server: "));
    }
}
