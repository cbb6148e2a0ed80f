// Endpoint table.
//
// Every remote operation is the same POST with a different name and a
// different list of accepted parameters, so the whole surface is data.
// The `endpoints!` macro below turns each row into an entry of
// `ENDPOINTS` and a method on `Session` with the same name.

use anyhow::Result;
use serde_json::Value;

use crate::api::{Args, Session};

/// One remote operation: its name (the last URL segment) and the order in
/// which positional arguments are mapped to parameter names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub name: &'static str,
    pub params: &'static [&'static str],
}

impl Endpoint {
    pub const fn new(name: &'static str, params: &'static [&'static str]) -> Self {
        Endpoint { name, params }
    }
}

/// Look up an endpoint by name.
pub fn find_endpoint(name: &str) -> Option<&'static Endpoint> {
    ENDPOINTS.iter().find(|e| e.name == name)
}

macro_rules! endpoints {
    ($($name:ident => [$($param:literal),* $(,)?];)*) => {
        /// All known endpoints.
        pub static ENDPOINTS: &[Endpoint] = &[
            $(Endpoint::new(stringify!($name), &[$($param),*]),)*
        ];

        impl Session {
            $(
                #[doc = concat!("POST `", stringify!($name), "`.")]
                pub fn $name(&self, args: Args) -> Result<Value> {
                    const ENDPOINT: Endpoint = Endpoint::new(stringify!($name), &[$($param),*]);
                    self.call(&ENDPOINT, args)
                }
            )*
        }
    };
}

endpoints! {
    who_am_i => [];
    get_snapshot => ["snapshot_id"];
    get_profile => ["username"];
    list_public_snapshots => ["username", "tag", "featured", "title", "page", "perPage", "sortby"];
    count_public_snapshots => ["username", "tag", "featured", "title"];

    // terminals
    list_terminals => [];
    get_terminal => ["container_key", "subdomain"];
    start_snapshot => [
        "snapshot_id", "cpu", "ram", "temporary", "name", "autopause", "startup_script", "custom_data",
    ];
    delete_terminal => ["container_key"];
    restart_terminal => ["container_key"];
    pause_terminal => ["container_key"];
    resume_terminal => ["container_key"];
    edit_terminal => ["container_key", "cpu", "ram", "diskspace", "name"];

    // snapshots
    list_snapshots => ["username", "tag", "featured", "title", "page", "perPage", "sortby"];
    count_snapshots => ["username", "tag", "featured", "title"];
    delete_snapshot => ["snapshot_id"];
    edit_snapshot => ["snapshot_id", "body", "title", "readme", "tags", "public", "custom_data"];
    snapshot_terminal => ["container_key", "body", "title", "readme", "tags", "public"];

    // links and access control
    add_terminal_links => ["container_key", "links"];
    remove_terminal_links => ["container_key", "links"];
    list_terminal_access => ["container_key"];
    edit_terminal_access => ["container_key", "is_public_list", "access_rules"];

    // domains
    get_cname_records => [];
    add_domain_to_pool => ["domain"];
    remove_domain_from_pool => ["domain"];
    add_cname_record => ["domain", "subdomain", "port"];
    remove_cname_record => ["domain"];

    // idle policy
    set_terminal_idle_settings => ["container_key", "triggers", "action"];
    get_terminal_idle_settings => ["container_key"];

    // billing
    instance_types => [];
    instance_price => ["status"];
    balance => [];
    balance_added => [];
    gift => ["email", "cents"];
    burn_history => [];
    terminal_usage_history => [];
    burn_state => [];
    burn_estimates => [];

    // keys
    add_authorized_key_to_terminal => ["container_key", "publicKey"];
    add_authorized_key_to_ssh_proxy => [];
    del_authorized_key_to_ssh_proxy => [];
    get_authorized_keys_from_ssh_proxy => [];

    request_progress => ["request_id"];
}
