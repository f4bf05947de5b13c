//! In-memory provider for command tests.
//!
//! `FakeCloud` is the session and both service clients at once. Clones share
//! state, so a test keeps one handle to inspect what the command did.
use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::rc::Rc;

use clap::Parser;
use serde_json::{Value, json};

use crate::api::compute::Pages;
use crate::api::{
    ApiError, ComputeApi, ContainerListOpts, ContainerOpts, ObjectStoreApi, ServerListOpts,
    Session,
};
use crate::cli::{Cli, OutputCtx, OutputFormat, resolve_format};
use crate::commands;
use crate::errors::RackError;
use crate::types::{Container, ContainerInfo};

#[derive(Debug, Clone, Default)]
pub struct FakeContainer {
    pub info: ContainerInfo,
    pub objects: Vec<String>,
}

#[derive(Debug, Default)]
pub struct CloudState {
    /// Clients handed out by the session.
    pub connects: usize,
    pub server_pages: Pages,
    pub server_queries: Vec<ServerListOpts>,
    pub containers: BTreeMap<String, FakeContainer>,
    /// Fail every API call with this status.
    pub fail_status: Option<u16>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeCloud(Rc<RefCell<CloudState>>);

fn status(method: &str, path: &str, status: u16) -> ApiError {
    ApiError::Status {
        method: method.to_owned(),
        url: format!("fake:///{path}"),
        status,
        body: String::new(),
    }
}

fn apply(info: &mut ContainerInfo, opts: &ContainerOpts) {
    if opts.read_acl.is_some() {
        info.read_acl.clone_from(&opts.read_acl);
    }
    if opts.write_acl.is_some() {
        info.write_acl.clone_from(&opts.write_acl);
    }
    info.metadata
        .extend(opts.metadata.iter().map(|(k, v)| (k.clone(), v.clone())));
    for key in &opts.remove_metadata {
        info.metadata.remove(key);
    }
}

impl FakeCloud {
    #[must_use]
    pub fn state(&self) -> Ref<'_, CloudState> {
        self.0.borrow()
    }

    #[must_use]
    pub fn state_mut(&self) -> RefMut<'_, CloudState> {
        self.0.borrow_mut()
    }

    pub fn add_container(&self, name: &str, objects: &[&str], metadata: &[(&str, &str)]) {
        let container = FakeContainer {
            info: ContainerInfo {
                name: name.to_owned(),
                metadata: metadata
                    .iter()
                    .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                    .collect(),
                ..ContainerInfo::default()
            },
            objects: objects.iter().map(|o| (*o).to_owned()).collect(),
        };
        self.state_mut()
            .containers
            .insert(name.to_owned(), container);
    }

    fn check(&self, method: &str, path: &str) -> Result<(), ApiError> {
        match self.state().fail_status {
            Some(code) => Err(status(method, path, code)),
            None => Ok(()),
        }
    }

    fn with_container<T>(
        &self,
        method: &str,
        name: &str,
        f: impl FnOnce(&mut FakeContainer) -> T,
    ) -> Result<T, ApiError> {
        self.check(method, name)?;
        let mut state = self.state_mut();
        let container = state
            .containers
            .get_mut(name)
            .ok_or_else(|| status(method, name, 404))?;
        Ok(f(container))
    }
}

impl Session for FakeCloud {
    fn compute(&self) -> Result<Box<dyn ComputeApi>, ApiError> {
        self.state_mut().connects += 1;
        Ok(Box::new(self.clone()))
    }

    fn object_store(&self) -> Result<Box<dyn ObjectStoreApi>, ApiError> {
        self.state_mut().connects += 1;
        Ok(Box::new(self.clone()))
    }
}

impl ComputeApi for FakeCloud {
    fn list_servers(&self, opts: &ServerListOpts) -> Result<Pages, ApiError> {
        self.check("GET", "servers/detail")?;
        let mut state = self.state_mut();
        state.server_queries.push(opts.clone());
        Ok(state.server_pages.clone())
    }

    fn get_server(&self, id: &str) -> Result<Value, ApiError> {
        self.check("GET", "servers")?;
        self.state()
            .server_pages
            .iter()
            .filter_map(|page| page.get("servers").and_then(Value::as_array))
            .flatten()
            .find(|server| server.get("id").and_then(Value::as_str) == Some(id))
            .map(|server| json!({ "server": server }))
            .ok_or_else(|| status("GET", &format!("servers/{id}"), 404))
    }
}

impl ObjectStoreApi for FakeCloud {
    fn list_containers(&self, opts: &ContainerListOpts) -> Result<Vec<Container>, ApiError> {
        self.check("GET", "")?;
        let limit = opts
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        Ok(self
            .state()
            .containers
            .values()
            .filter(|c| {
                opts.prefix
                    .as_deref()
                    .is_none_or(|prefix| c.info.name.starts_with(prefix))
            })
            .take(limit)
            .map(|c| Container {
                name: c.info.name.clone(),
                count: c.objects.len() as u64,
                bytes: 0,
            })
            .collect())
    }

    fn create_container(&self, name: &str, opts: &ContainerOpts) -> Result<(), ApiError> {
        self.check("PUT", name)?;
        let mut state = self.state_mut();
        let container = state
            .containers
            .entry(name.to_owned())
            .or_insert_with(|| FakeContainer {
                info: ContainerInfo {
                    name: name.to_owned(),
                    ..ContainerInfo::default()
                },
                objects: Vec::new(),
            });
        apply(&mut container.info, opts);
        Ok(())
    }

    fn get_container(&self, name: &str) -> Result<ContainerInfo, ApiError> {
        self.with_container("HEAD", name, |c| ContainerInfo {
            object_count: c.objects.len() as u64,
            ..c.info.clone()
        })
    }

    fn update_container(&self, name: &str, opts: &ContainerOpts) -> Result<(), ApiError> {
        self.with_container("POST", name, |c| apply(&mut c.info, opts))
    }

    fn delete_container(&self, name: &str) -> Result<(), ApiError> {
        let empty = self.with_container("DELETE", name, |c| c.objects.is_empty())?;
        if !empty {
            return Err(status("DELETE", name, 409));
        }
        self.state_mut().containers.remove(name);
        Ok(())
    }

    fn list_objects(&self, container: &str) -> Result<Vec<String>, ApiError> {
        self.with_container("GET", container, |c| c.objects.clone())
    }

    fn delete_object(&self, container: &str, object: &str) -> Result<(), ApiError> {
        let found = self.with_container("DELETE", container, |c| {
            let before = c.objects.len();
            c.objects.retain(|o| o != object);
            c.objects.len() < before
        })?;
        if found {
            Ok(())
        } else {
            Err(status("DELETE", &format!("{container}/{object}"), 404))
        }
    }
}

/// Parse `argv` (without the binary name) and dispatch against `cloud`.
/// Returns the command result and everything written to stdout.
pub fn run(cloud: &FakeCloud, argv: &[&str]) -> (Result<(), RackError>, String) {
    let cli = Cli::try_parse_from(std::iter::once("rack").chain(argv.iter().copied()))
        .expect("arguments should parse");
    let format = resolve_format(cli.output, cli.json, OutputFormat::Table);
    let ctx = OutputCtx::new(format, cli.fields.as_deref(), cli.no_header);
    let mut out = Vec::new();
    let result = commands::dispatch(&cli.command, &ctx, cloud, &mut out);
    (result, String::from_utf8(out).expect("output should be UTF-8"))
}
