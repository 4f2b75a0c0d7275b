// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::filters::{categories_for, TypeFilter};
use crate::models::CategoryType;
use crate::store;
use crate::utils::{id_for_category, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let kind = sub.get_one::<String>("type").unwrap().parse::<CategoryType>()?;
            let id = store::create_category(conn, name, kind)?;
            println!("Added {} category '{}' (id {})", kind, name.trim(), id);
        }
        Some(("list", sub)) => {
            let type_filter = sub.get_one::<String>("type").unwrap().parse::<TypeFilter>()?;
            let all = store::list_categories(conn)?;
            let shown = categories_for(type_filter, &all);
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &shown)? {
                let data = shown
                    .iter()
                    .map(|c| vec![c.id.to_string(), c.name.clone(), c.r#type.to_string()])
                    .collect();
                println!("{}", pretty_table(&["Id", "Category", "Type"], data));
            }
        }
        Some(("rename", sub)) => {
            let id = id_for_category(conn, sub.get_one::<String>("category").unwrap())?;
            let name = sub.get_one::<String>("name").unwrap();
            store::rename_category(conn, id, name)?;
            println!("Renamed category {} to '{}'", id, name.trim());
        }
        Some(("rm", sub)) => {
            let key = sub.get_one::<String>("category").unwrap();
            let id = id_for_category(conn, key)?;
            let detached = store::soft_delete_category(conn, id)?;
            println!("Removed category '{}' ({} entries detached)", key, detached);
        }
        _ => {}
    }
    Ok(())
}
