//! Record types shared by the marshal tests.

use std::collections::{BTreeMap, HashMap};

use crate::Reflect;
use crate::value::Function;

#[derive(Debug, Clone, Default, PartialEq, Reflect)]
pub struct Person {
    #[js("name")]
    pub name: String,
    #[js("age")]
    pub age: i64,
    pub nickname: String,
}

#[derive(Debug, Clone, Default, PartialEq, Reflect)]
pub struct Scalars {
    #[js("small")]
    pub small: i8,
    #[js("big")]
    pub big: i64,
    #[js("count")]
    pub count: u32,
    #[js("label")]
    pub label: String,
    #[js("flag")]
    pub flag: bool,
    #[js("ratio")]
    pub ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Reflect)]
pub struct Team {
    #[js("name")]
    pub name: String,
    #[js("lead")]
    pub lead: Person,
    #[js("members")]
    pub members: Vec<Person>,
    #[js("scores")]
    pub scores: Vec<Vec<i32>>,
}

#[derive(Debug, Clone, Default, PartialEq, Reflect)]
pub struct Inventory {
    #[js("stock")]
    pub stock: HashMap<String, u32>,
    #[js("owners")]
    pub owners: BTreeMap<String, Person>,
}

#[derive(Debug, Clone, Default, PartialEq, Reflect)]
pub struct Account {
    #[js("id")]
    pub id: u64,
    #[js("by_id")]
    pub by_id: BTreeMap<u32, String>,
}

#[derive(Debug, Clone, Default, Reflect)]
pub struct WithFunction {
    #[js("name")]
    pub name: String,
    #[js("callback")]
    pub callback: Function,
}

#[derive(Debug, Clone, Default, Reflect)]
pub struct Hooks {
    #[js("name")]
    pub name: String,
    #[js("steps")]
    pub steps: Vec<Function>,
    #[js("handlers")]
    pub handlers: BTreeMap<String, Function>,
}

#[derive(Debug, Clone, Default, PartialEq, Reflect)]
pub struct Pixel {
    #[js("rgb")]
    pub rgb: [u8; 3],
}
