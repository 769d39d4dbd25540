#![allow(non_snake_case)]

// Базовые модули
pub mod consts;
pub mod config;
pub mod metrics;

// Модульная раскладка (папки с mod.rs)
pub mod store; // src/store/{mod,core,alloc,io,free,dump}.rs
pub mod entry; // src/entry/{mod,types,args,traits}.rs
pub mod codec; // src/codec/{mod,prim,lists,entry}.rs
pub mod nav;   // src/nav/{mod,state,build}.rs

// CLI (entrydb)
pub mod cli;

// Удобные реэкспорты
pub use codec::{
    decode_entry, decode_entry_tree, encode_entry, encode_entry_tree, StorageRead, StorageWrite,
};
pub use config::{StoreBuilder, StoreConfig};
pub use entry::{DocBlock, Entry, Section, Trait, Traits};
pub use nav::{EntryTree, NavState, NodeId};
pub use store::{hex_dump, Store, StoreState, StoreStats};
