// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bake basics.
//!
//! Distribute input handlers over a small widget tree with `understory_bake`,
//! then move one handler and bake again to see the dirty nodes.
//!
//! Run:
//! - `cargo run -p understory_demos --example bake_basics`
//! - `RUST_LOG=understory_bake=trace cargo run -p understory_demos --example bake_basics`

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use understory_bake::{BakeHost, Baker, OwnershipTable};
use understory_path::{Hierarchy, PathIndex};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct Widget(usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct Handler(&'static str);

struct Ui {
    names: Vec<&'static str>,
    parent: Vec<Option<usize>>,
    slot: Vec<usize>,
    handlers: Vec<(Handler, Widget, i32)>,
    table: OwnershipTable<Widget, Handler>,
}

impl Ui {
    fn add(&mut self, name: &'static str, parent: Option<Widget>) -> Widget {
        let id = self.names.len();
        let slot = self
            .parent
            .iter()
            .filter(|p| **p == parent.map(|w| w.0))
            .count();
        self.names.push(name);
        self.parent.push(parent.map(|w| w.0));
        self.slot.push(slot);
        Widget(id)
    }

    fn handler(&mut self, name: &'static str, on: Widget, order: i32) -> Handler {
        let handler = Handler(name);
        self.handlers.push((handler, on, order));
        handler
    }

    fn find(&self, handler: Handler) -> Option<&(Handler, Widget, i32)> {
        self.handlers.iter().find(|(h, _, _)| *h == handler)
    }
}

impl Hierarchy<Widget> for Ui {
    fn parent(&self, node: Widget) -> Option<Widget> {
        self.parent[node.0].map(Widget)
    }

    fn sibling_index(&self, node: Widget) -> usize {
        self.slot[node.0]
    }
}

impl BakeHost<Widget, Handler> for Ui {
    fn leaf_host(&self, leaf: Handler) -> Widget {
        self.find(leaf).map_or(Widget(0), |(_, on, _)| *on)
    }

    fn execution_order(&self, leaf: Handler) -> Option<i32> {
        self.find(leaf).map(|(_, _, order)| *order)
    }

    fn assign_leaves(&mut self, node: Widget, leaves: &[Handler]) -> bool {
        self.table.assign_leaves(node, leaves)
    }

    fn assign_nested(&mut self, node: Widget, nested: &[Widget]) -> bool {
        self.table.assign_nested(node, nested)
    }
}

fn report(ui: &Ui, owners: &[Widget]) {
    let mut index = PathIndex::new();
    for &owner in owners {
        let path = match index.create(ui, owner) {
            Ok(path) => path,
            Err(err) => {
                println!("  {}: {err}", ui.names[owner.0]);
                continue;
            }
        };
        let leaves: Vec<&str> = ui.table.leaves(owner).iter().map(|h| h.0).collect();
        let nested: Vec<&str> = ui
            .table
            .nested(owner)
            .iter()
            .map(|w| ui.names[w.0])
            .collect();
        println!(
            "  {:<8} at {:<6} handlers {:?} nested {:?}",
            ui.names[owner.0],
            index.display(&path).to_string(),
            leaves,
            nested
        );
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // window
    // ├─ toolbar        (owner)
    // │  └─ button
    // └─ panel
    //    ├─ list        (owner)
    //    │  └─ row      (owner)
    //    └─ footer
    let mut ui = Ui {
        names: Vec::new(),
        parent: Vec::new(),
        slot: Vec::new(),
        handlers: Vec::new(),
        table: OwnershipTable::new(),
    };
    let window = ui.add("window", None);
    let toolbar = ui.add("toolbar", Some(window));
    let button = ui.add("button", Some(toolbar));
    let panel = ui.add("panel", Some(window));
    let list = ui.add("list", Some(panel));
    let row = ui.add("row", Some(list));
    let footer = ui.add("footer", Some(panel));

    let handlers = [
        ui.handler("shortcuts", window, 0),
        ui.handler("click", button, 1),
        ui.handler("hover", button, -1),
        ui.handler("scroll", list, 0),
        ui.handler("select", row, 0),
        ui.handler("resize", footer, 0),
    ];
    let owners = [window, toolbar, list, row];

    let mut baker = Baker::new();
    match baker.bake(&mut ui, owners, handlers) {
        Ok(result) => println!("First bake: {result:?}"),
        Err(err) => println!("First bake failed: {err}"),
    }
    report(&ui, &owners);

    // The footer handler moves onto the row, leaving the window.
    if let Some(entry) = ui.handlers.iter_mut().find(|(h, _, _)| h.0 == "resize") {
        entry.1 = row;
    }
    match baker.bake(&mut ui, owners, handlers) {
        Ok(result) => println!("After moving `resize`: {result:?}"),
        Err(err) => println!("Second bake failed: {err}"),
    }
    report(&ui, &owners);
}
