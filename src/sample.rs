//! Built-in sample application.
//!
//! Stands in for the host web service: a small items/users API whose
//! handlers carry [`trace_line!`] probes. The CLI debugs it directly and the
//! integration tests drive the orchestrator against it. Each route registers
//! its declared source text and start line the way a host's reflection
//! facility would supply them.
//!
//! The `*_LINE` constants rely on their `line!()` resolving to the
//! declaration itself; each handler must start on the very next line.

use crate::routing::{CallArgs, Handler, HandlerResult, ParameterSpec, RouteDescriptor, RouteTable};
use crate::trace_line;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub is_offer: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

static ITEMS: LazyLock<Mutex<BTreeMap<i64, Item>>> = LazyLock::new(|| {
    Mutex::new(BTreeMap::from([
        (
            1,
            Item {
                name: "Foo".to_string(),
                price: 50.2,
                is_offer: None,
            },
        ),
        (
            2,
            Item {
                name: "Bar".to_string(),
                price: 62.0,
                is_offer: Some(true),
            },
        ),
    ]))
});

static USERS: LazyLock<Mutex<BTreeMap<i64, User>>> =
    LazyLock::new(|| Mutex::new(BTreeMap::new()));

fn items() -> MutexGuard<'static, BTreeMap<i64, Item>> {
    ITEMS.lock().unwrap_or_else(PoisonError::into_inner)
}

fn users() -> MutexGuard<'static, BTreeMap<i64, User>> {
    USERS.lock().unwrap_or_else(PoisonError::into_inner)
}

const READ_ROOT_SRC: &str = r#"fn read_root(_args: CallArgs) -> HandlerResult {
    let message = "Welcome to the sample API server";
    trace_line!(message);
    Ok(json!({ "message": message }))
}"#;
const READ_ROOT_LINE: u32 = line!() + 1;
fn read_root(_args: CallArgs) -> HandlerResult {
    let message = "Welcome to the sample API server";
    trace_line!(message);
    Ok(json!({ "message": message }))
}

const READ_ITEM_SRC: &str = r#"fn read_item(args: CallArgs) -> HandlerResult {
    let item_id = args.i64("item_id")?;
    trace_line!(item_id);
    let q = args.str("q").map(str::to_string);
    trace_line!(item_id, q);
    let Some(item) = lookup_item(item_id) else {
        bail!("Item not found: {item_id}");
    };
    trace_line!(item_id, q, item);
    Ok(json!({ "item_id": item_id, "item": item }))
}"#;
const READ_ITEM_LINE: u32 = line!() + 1;
fn read_item(args: CallArgs) -> HandlerResult {
    let item_id = args.i64("item_id")?;
    trace_line!(item_id);
    let q = args.str("q").map(str::to_string);
    trace_line!(item_id, q);
    let Some(item) = lookup_item(item_id) else {
        bail!("Item not found: {item_id}");
    };
    trace_line!(item_id, q, item);
    Ok(json!({ "item_id": item_id, "item": item }))
}

/// Same-file helper: its probes interleave with the calling handler's lines.
fn lookup_item(item_id: i64) -> Option<Item> {
    let found = items().get(&item_id).cloned();
    trace_line!(item_id, found);
    found
}

const LIST_ITEMS_SRC: &str = r#"async fn list_items(_args: CallArgs) -> HandlerResult {
    let count = items().len();
    trace_line!(count);
    tokio::task::yield_now().await;
    let listed: Vec<Item> = items().values().cloned().collect();
    trace_line!(count, listed);
    Ok(json!({ "count": count, "items": listed }))
}"#;
const LIST_ITEMS_LINE: u32 = line!() + 1;
async fn list_items(_args: CallArgs) -> HandlerResult {
    let count = items().len();
    trace_line!(count);
    tokio::task::yield_now().await;
    let listed: Vec<Item> = items().values().cloned().collect();
    trace_line!(count, listed);
    Ok(json!({ "count": count, "items": listed }))
}

const CREATE_ITEM_SRC: &str = r#"fn create_item(args: CallArgs) -> HandlerResult {
    let item: Item = args.model("item")?;
    trace_line!(item);
    let mut store = items();
    let new_id = store.keys().max().copied().unwrap_or(0) + 1;
    trace_line!(item, new_id);
    store.insert(new_id, item.clone());
    drop(store);
    trace_line!(item, new_id);
    Ok(json!({ "item_id": new_id, "item": item }))
}"#;
const CREATE_ITEM_LINE: u32 = line!() + 1;
fn create_item(args: CallArgs) -> HandlerResult {
    let item: Item = args.model("item")?;
    trace_line!(item);
    let mut store = items();
    let new_id = store.keys().max().copied().unwrap_or(0) + 1;
    trace_line!(item, new_id);
    store.insert(new_id, item.clone());
    drop(store);
    trace_line!(item, new_id);
    Ok(json!({ "item_id": new_id, "item": item }))
}

const UPDATE_ITEM_SRC: &str = r#"fn update_item(args: CallArgs) -> HandlerResult {
    let item_id = args.i64("item_id")?;
    let item: Item = args.model("item")?;
    trace_line!(item_id, item);
    let mut store = items();
    if !store.contains_key(&item_id) {
        bail!("Item not found: {item_id}");
    }
    store.insert(item_id, item.clone());
    trace_line!(item_id, item);
    Ok(json!({ "item_id": item_id, "item": item }))
}"#;
const UPDATE_ITEM_LINE: u32 = line!() + 1;
fn update_item(args: CallArgs) -> HandlerResult {
    let item_id = args.i64("item_id")?;
    let item: Item = args.model("item")?;
    trace_line!(item_id, item);
    let mut store = items();
    if !store.contains_key(&item_id) {
        bail!("Item not found: {item_id}");
    }
    store.insert(item_id, item.clone());
    trace_line!(item_id, item);
    Ok(json!({ "item_id": item_id, "item": item }))
}

const DELETE_ITEM_SRC: &str = r#"fn delete_item(args: CallArgs) -> HandlerResult {
    let item_id = args.i64("item_id")?;
    trace_line!(item_id);
    let mut store = items();
    if store.remove(&item_id).is_none() {
        bail!("Item not found: {item_id}");
    }
    let remaining = store.len();
    trace_line!(item_id, remaining);
    Ok(json!({ "message": "Item deleted successfully" }))
}"#;
const DELETE_ITEM_LINE: u32 = line!() + 1;
fn delete_item(args: CallArgs) -> HandlerResult {
    let item_id = args.i64("item_id")?;
    trace_line!(item_id);
    let mut store = items();
    if store.remove(&item_id).is_none() {
        bail!("Item not found: {item_id}");
    }
    let remaining = store.len();
    trace_line!(item_id, remaining);
    Ok(json!({ "message": "Item deleted successfully" }))
}

const CREATE_USER_SRC: &str = r#"fn create_user(args: CallArgs) -> HandlerResult {
    let user: User = args.model("user")?;
    trace_line!(user);
    let mut store = users();
    let new_id = store.len() as i64 + 1;
    store.insert(new_id, user.clone());
    trace_line!(user, new_id);
    Ok(json!(user))
}"#;
const CREATE_USER_LINE: u32 = line!() + 1;
fn create_user(args: CallArgs) -> HandlerResult {
    let user: User = args.model("user")?;
    trace_line!(user);
    let mut store = users();
    let new_id = store.len() as i64 + 1;
    store.insert(new_id, user.clone());
    trace_line!(user, new_id);
    Ok(json!(user))
}

/// The sample application's route table.
pub fn sample_routes() -> RouteTable {
    let mut table = RouteTable::new();
    table.route(
        RouteDescriptor::new("GET", "/", Handler::blocking(read_root))
            .layer("auth-check")
            .layer("request-logging")
            .source(file!(), READ_ROOT_LINE, READ_ROOT_SRC),
    );
    table.route(
        RouteDescriptor::new("GET", "/items/{item_id}", Handler::blocking(read_item))
            .param(ParameterSpec::scalar("item_id"))
            .param(ParameterSpec::scalar("q"))
            .source(file!(), READ_ITEM_LINE, READ_ITEM_SRC),
    );
    table.route(
        RouteDescriptor::new("GET", "/items/", Handler::suspending(list_items))
            .source(file!(), LIST_ITEMS_LINE, LIST_ITEMS_SRC),
    );
    table.route(
        RouteDescriptor::new("POST", "/items/", Handler::blocking(create_item))
            .param(ParameterSpec::model::<Item>("item"))
            .source(file!(), CREATE_ITEM_LINE, CREATE_ITEM_SRC),
    );
    table.route(
        RouteDescriptor::new("PUT", "/items/{item_id}", Handler::blocking(update_item))
            .param(ParameterSpec::scalar("item_id"))
            .param(ParameterSpec::model::<Item>("item"))
            .source(file!(), UPDATE_ITEM_LINE, UPDATE_ITEM_SRC),
    );
    table.route(
        RouteDescriptor::new("DELETE", "/items/{item_id}", Handler::blocking(delete_item))
            .param(ParameterSpec::scalar("item_id"))
            .source(file!(), DELETE_ITEM_LINE, DELETE_ITEM_SRC),
    );
    table.route(
        RouteDescriptor::new("POST", "/users/", Handler::blocking(create_user))
            .param(ParameterSpec::model::<User>("user"))
            .source(file!(), CREATE_USER_LINE, CREATE_USER_SRC),
    );
    table
}
