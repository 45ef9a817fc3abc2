//! Shared fixtures: people who work for companies which have a CEO and a
//! headquarters address. Friend lists and CEOs are set after construction so
//! tests can build cycles.

#![allow(dead_code)]

use std::sync::{Arc, RwLock};

use hypermedia::prelude::*;

pub struct Person {
    pub id: u64,
    pub first_name: String,
    pub age: u32,
    pub nickname: Option<String>,
    pub job: Option<Arc<Company>>,
    pub friends: RwLock<Vec<Arc<Person>>>,
}

pub struct Company {
    pub id: u64,
    pub name: String,
    pub ceo: RwLock<Option<Arc<Person>>>,
    pub headquarters: Option<Arc<Address>>,
}

pub struct Address {
    pub id: u64,
    pub city: String,
}

impl Resource for Person {
    fn descriptor() -> hypermedia::Result<ResourceDescriptor> {
        ResourceDescriptor::builder::<Person>("person")
            .id(|p| p.id)
            .url_path("people")
            .attribute("first_name", |p| p.first_name.clone())
            .attribute("age", |p| p.age)
            .attribute_with("nickname", FieldType::Text, |p| {
                p.nickname.as_deref().map(|n| FieldValue::Text(n.into()))
            })
            .to_one("job", |p| p.job.clone())
            .to_many("friends", |p| {
                p.friends.read().map(|f| f.clone()).unwrap_or_default()
            })
            .build()
    }
}

impl Resource for Company {
    fn descriptor() -> hypermedia::Result<ResourceDescriptor> {
        ResourceDescriptor::builder::<Company>("corporation")
            .id(|c| c.id)
            .url_path("companies")
            .attribute("name", |c| c.name.clone())
            .to_one("ceo", |c| c.ceo.read().ok().and_then(|ceo| ceo.clone()))
            .to_one("headquarters", |c| c.headquarters.clone())
            .build()
    }
}

impl Resource for Address {
    fn descriptor() -> hypermedia::Result<ResourceDescriptor> {
        ResourceDescriptor::builder::<Address>("address")
            .id(|a| a.id)
            .attribute("city", |a| a.city.clone())
            .build()
    }
}

pub fn person(id: u64, first_name: &str, age: u32) -> Arc<Person> {
    employee(id, first_name, age, None)
}

pub fn employee(id: u64, first_name: &str, age: u32, job: Option<Arc<Company>>) -> Arc<Person> {
    Arc::new(Person {
        id,
        first_name: first_name.to_string(),
        age,
        nickname: None,
        job,
        friends: RwLock::new(Vec::new()),
    })
}

pub fn company(id: u64, name: &str) -> Arc<Company> {
    Arc::new(Company {
        id,
        name: name.to_string(),
        ceo: RwLock::new(None),
        headquarters: None,
    })
}

pub fn address(id: u64, city: &str) -> Arc<Address> {
    Arc::new(Address {
        id,
        city: city.to_string(),
    })
}

pub fn headquartered(id: u64, name: &str, headquarters: Arc<Address>) -> Arc<Company> {
    Arc::new(Company {
        id,
        name: name.to_string(),
        ceo: RwLock::new(None),
        headquarters: Some(headquarters),
    })
}

pub fn befriend(person: &Arc<Person>, friend: &Arc<Person>) {
    person.friends.write().unwrap().push(Arc::clone(friend));
}

/// `count` people with ids `0..count` and ages cycling through 20..25.
pub fn people(count: u64) -> Vec<Arc<Person>> {
    (0..count)
        .map(|id| person(id, &format!("person-{id}"), 20 + (id % 5) as u32))
        .collect()
}

pub fn serializer(config: SerializerConfig) -> ResourceSerializer {
    ResourceSerializer::new(Arc::new(SchemaRegistry::new()), config)
}

pub fn request(path_and_query: &str) -> RequestContext {
    RequestContext::parse(&format!("http://api.test{path_and_query}")).unwrap()
}

/// Serializes one person, panicking on error documents.
pub fn render_person(person: Arc<Person>, path_and_query: &str) -> serde_json::Value {
    let response = serializer(SerializerConfig::default())
        .serialize::<Person, _>(Payload::One(person), &request(path_and_query));
    assert!(response.is_success(), "{:?}", response.document.errors);
    response.to_value()
}

/// `(type, id)` of every resource in `data` and `included`.
pub fn identities(doc: &serde_json::Value) -> Vec<(String, String)> {
    let data = match &doc["data"] {
        serde_json::Value::Array(items) => items.clone(),
        serde_json::Value::Null => Vec::new(),
        one => vec![one.clone()],
    };
    let included = doc["included"].as_array().cloned().unwrap_or_default();
    data.iter()
        .chain(included.iter())
        .map(|r| {
            (
                r["type"].as_str().unwrap_or_default().to_string(),
                r["id"].as_str().unwrap_or_default().to_string(),
            )
        })
        .collect()
}
