mod common;

use std::sync::Arc;

use common::*;
use hypermedia::prelude::*;
use serde_json::json;

fn john() -> Arc<Person> {
    employee(123, "John", 34, Some(company(456, "Acme")))
}

#[test]
fn person_with_job_renders_compound_document() {
    let doc = render_person(john(), "/people/123/");

    assert_eq!(
        doc,
        json!({
            "data": {
                "type": "person",
                "id": "123",
                "attributes": { "first-name": "John", "age": 34 },
                "relationships": {
                    "friends": {
                        "links": {
                            "self": "http://api.test/people/123/relationships/friends/",
                            "related": "http://api.test/people/123/friends/"
                        },
                        "data": []
                    },
                    "job": {
                        "links": {
                            "self": "http://api.test/people/123/relationships/job/",
                            "related": "http://api.test/people/123/job/"
                        },
                        "data": { "type": "corporation", "id": "456" }
                    }
                }
            },
            "included": [{
                "type": "corporation",
                "id": "456",
                "attributes": { "name": "Acme" },
                "relationships": {
                    "ceo": {
                        "links": {
                            "self": "http://api.test/companies/456/relationships/ceo/",
                            "related": "http://api.test/companies/456/ceo/"
                        },
                        "data": null
                    },
                    "headquarters": {
                        "links": {
                            "self": "http://api.test/companies/456/relationships/headquarters/",
                            "related": "http://api.test/companies/456/headquarters/"
                        },
                        "data": null
                    }
                }
            }],
            "links": { "self": "http://api.test/people/123/" }
        })
    );
}

#[test]
fn include_limits_included_resources() {
    let acme = company(456, "Acme");
    *acme.ceo.write().unwrap() = Some(person(1, "Boss", 60));
    let john = employee(123, "John", 34, Some(acme));
    befriend(&john, &person(7, "Jane", 33));

    let doc = render_person(Arc::clone(&john), "/people/123/?include=job");
    assert_eq!(identities(&doc), [
        ("person".to_string(), "123".to_string()),
        ("corporation".to_string(), "456".to_string()),
    ]);
    // Not requested: linkage is omitted, links remain.
    assert!(doc["data"]["relationships"]["friends"].get("data").is_none());
    assert!(doc["data"]["relationships"]["friends"]["links"].is_object());
    assert!(doc["included"][0]["relationships"]["ceo"].get("data").is_none());

    let doc = render_person(john, "/people/123/?include=job.ceo,friends");
    let included: Vec<_> = identities(&doc).into_iter().skip(1).collect();
    assert_eq!(included.len(), 3);
    assert_eq!(doc["included"].as_array().unwrap().len(), 3);
}

#[test]
fn include_accepts_any_naming() {
    let john = john();
    let kebab = render_person(Arc::clone(&john), "/people/123/?include=job");
    let camel = render_person(john, "/people/123/?include=Job");
    assert_eq!(kebab["data"], camel["data"]);
    assert_eq!(kebab["included"], camel["included"]);
}

#[test]
fn disabled_default_inclusion() {
    let config = SerializerConfig {
        disable_default_included: true,
        ..SerializerConfig::default()
    };
    let s = serializer(config);

    let doc = s
        .serialize::<Person, _>(Payload::One(john()), &request("/people/123/"))
        .to_value();
    assert!(doc.get("included").is_none());
    assert!(doc["data"]["relationships"]["job"].get("data").is_none());

    let doc = s
        .serialize::<Person, _>(Payload::One(john()), &request("/people/123/?include=job"))
        .to_value();
    assert_eq!(doc["included"][0]["id"], "456");
}

#[test]
fn collection_items_carry_self_links() {
    let response = serializer(SerializerConfig::default())
        .serialize::<Person, _>(Payload::many(people(2)), &request("/people/"));
    let doc = response.to_value();

    assert_eq!(doc["data"][1]["links"]["self"], "http://api.test/people/1/");
    assert_eq!(doc["links"]["self"], "http://api.test/people/");
    let response = serializer(SerializerConfig::default()).serialize::<Person, _>(
        Payload::many(vec![employee(1, "Ann", 30, Some(company(456, "Acme")))]),
        &request("/people/"),
    );
    let doc = response.to_value();
    assert_eq!(doc["data"][0]["links"]["self"], "http://api.test/people/1/");
    assert_eq!(doc["included"][0]["id"], "456");
    assert!(doc["included"][0].get("links").is_none());

    // A single resource doesn't repeat its own URL.
    assert!(render_person(john(), "/people/123/")["data"].get("links").is_none());
}

#[test]
fn empty_collection_and_null_resource() {
    let s = serializer(SerializerConfig::default());

    let doc = s
        .serialize::<Person, _>(Payload::many(Vec::<Arc<Person>>::new()), &request("/people/"))
        .to_value();
    assert_eq!(doc["data"], json!([]));
    assert_eq!(doc["included"], json!([]));

    let doc = s
        .serialize::<Person, Arc<Person>>(Payload::Null, &request("/people/9/"))
        .to_value();
    assert_eq!(doc, json!({ "data": null, "links": { "self": "http://api.test/people/9/" } }));
}

#[test]
fn naming_convention_and_absent_attributes() {
    let config = SerializerConfig {
        naming: NamingConvention::Camel,
        ..SerializerConfig::default()
    };
    let nicknamed = Arc::new(Person {
        id: 5,
        first_name: "Joanna".into(),
        age: 40,
        nickname: Some("Jo".into()),
        job: None,
        friends: Default::default(),
    });
    let doc = serializer(config)
        .serialize::<Person, _>(
            Payload::many(vec![nicknamed, person(6, "Ann", 41)]),
            &request("/people/"),
        )
        .to_value();

    assert_eq!(doc["data"][0]["attributes"]["firstName"], "Joanna");
    assert_eq!(doc["data"][0]["attributes"]["nickname"], "Jo");
    assert!(doc["data"][1]["attributes"].get("nickname").is_none());
}

#[test]
fn url_prefix_applies_to_every_link() {
    let config = SerializerConfig {
        url_prefix: "api/v1".into(),
        ..SerializerConfig::default()
    };
    let doc = serializer(config)
        .serialize::<Person, _>(Payload::many(people(1)), &request("/api/v1/people/"))
        .to_value();
    assert_eq!(doc["data"][0]["links"]["self"], "http://api.test/api/v1/people/0/");
    assert_eq!(
        doc["data"][0]["relationships"]["job"]["links"]["related"],
        "http://api.test/api/v1/people/0/job/"
    );
}

// ============================================================================
// Link visibility and meta
// ============================================================================

struct Tag {
    id: String,
    label: String,
    parent: Option<Arc<Tag>>,
}

impl Resource for Tag {
    fn descriptor() -> hypermedia::Result<ResourceDescriptor> {
        ResourceDescriptor::builder::<Tag>("tag")
            .id(|t| t.id.clone())
            .attribute("label", |t| t.label.clone())
            .to_one_with(
                "parent",
                RelationshipOptions::new()
                    .url_segment("parent-tag")
                    .links(LinkVisibility::RELATED),
                |t| t.parent.clone(),
            )
            .links(LinkVisibility::NONE)
            .meta(|tags, many| many.then(|| json!({ "count": tags.len() })))
            .build()
    }
}

fn tag(id: &str, parent: Option<Arc<Tag>>) -> Arc<Tag> {
    Arc::new(Tag {
        id: id.into(),
        label: id.to_uppercase(),
        parent,
    })
}

#[test]
fn link_visibility_and_meta() {
    let root = tag("a b", None);
    let tags = vec![tag("x", Some(root)), tag("y", None)];

    let doc = serializer(SerializerConfig::default())
        .serialize::<Tag, _>(Payload::many(tags), &request("/tags/"))
        .to_value();

    assert!(doc.get("links").is_none());
    assert!(doc["data"][0].get("links").is_none());
    assert_eq!(
        doc["data"][0]["relationships"]["parent"]["links"],
        json!({ "related": "http://api.test/tag/x/parent-tag/" })
    );
    assert_eq!(doc["meta"], json!({ "count": 2 }));
    assert_eq!(doc["included"][0]["id"], "a b");
}

#[test]
fn config_from_toml() {
    let config = SerializerConfig::parse(
        r#"
        naming = "snake"
        url_prefix = "v2"
        disable_default_included = true

        [pagination]
        per_page = 5
        page_size_limit = 20
        "#,
    )
    .unwrap();

    let doc = serializer(config)
        .serialize::<Person, _>(Payload::many(people(12)), &request("/v2/people/?page[number]=2"))
        .to_value();
    assert_eq!(doc["data"].as_array().unwrap().len(), 2);
    assert_eq!(doc["data"][0]["attributes"]["first_name"], "person-10");
    assert!(doc["links"].get("next").is_none());
    assert!(doc.get("included").is_none());
}
