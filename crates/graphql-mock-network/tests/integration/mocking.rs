use std::sync::{Arc, Mutex};

use graphql_mock_network::{Arguments, Mock, MockError, MockLayer};
use serde_json::json;

use crate::{network, runtime, PHOTO_QUERY, TODO_QUERY};

fn default_mocks() -> MockLayer {
    MockLayer::new().with_field_mock(
        "Query",
        "todo",
        Mock::from_fn(|_| {
            json!({
                "id": "xyz",
                "title": "I am a manually mocked todo!",
            })
        }),
    )
}

#[test]
fn mocks_a_query() {
    runtime().block_on(async {
        let network = network(default_mocks());

        let response = network.query(TODO_QUERY, variables!({ "id": 1 })).await;

        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "todo": {
              "id": "xyz",
              "title": "I am a manually mocked todo!"
            }
          }
        }
        "###);
    });
}

#[test]
fn mocks_a_mutation() {
    runtime().block_on(async {
        let mut network = network(default_mocks());

        network.add_mocks(MockLayer::new().with_mock(
            "Mutation",
            Mock::from_fn(|_| {
                Mock::fields([(
                    "createPhoto",
                    Mock::from_fn(|_| {
                        json!({
                            "id": "1",
                            "title": "Family Holiday",
                            "url": "http://url.com",
                            "thumbnailUrl": "http://url.com/thumbnail",
                        })
                    }),
                )])
            }),
        ));

        let response = network
            .query(
                r#"
                mutation createPhoto($title: String!, $url: String!, $thumbnailUrl: String!) {
                    createPhoto(input: { title: $title, url: $url, thumbnailUrl: $thumbnailUrl }) {
                        id
                        title
                    }
                }
                "#,
                variables!({
                    "title": "Family Holiday",
                    "url": "http://url.com",
                    "thumbnailUrl": "http://url.com/thumbnail",
                }),
            )
            .await;

        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "createPhoto": {
              "id": "1",
              "title": "Family Holiday"
            }
          }
        }
        "###);
    });
}

#[test]
fn mocks_a_scalar_type() {
    runtime().block_on(async {
        let mut network = network(default_mocks());

        network.add_mocks(
            MockLayer::new().with_mock("ID", Mock::from_fn(|_| json!("200"))).with_mock(
                "Query",
                Mock::from_fn(|_| {
                    Mock::fields([(
                        "todo",
                        Mock::from_fn(|_| json!({ "title": "I am a manually mocked todo!" })),
                    )])
                }),
            ),
        );

        let response = network.query(TODO_QUERY, variables!({ "id": 1 })).await;

        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "todo": {
              "id": "200",
              "title": "I am a manually mocked todo!"
            }
          }
        }
        "###);
    });
}

#[test]
fn producer_errors_only_fail_their_field() {
    runtime().block_on(async {
        let mut network = network(default_mocks());

        network.add_mocks(
            MockLayer::new().with_mock(
                "Query",
                Mock::from_fn(|_| Mock::fields([("photo", Mock::error("Oh dear, this is bad"))])),
            ),
        );

        let response = network
            .query(
                r#"
                query photo($id: ID!) {
                    photo(id: $id) { id title }
                    todo(id: $id) { id title }
                }
                "#,
                variables!({ "id": 1 }),
            )
            .await;

        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].message, "Oh dear, this is bad");
        assert_eq!(response.errors[0].path, [json!("photo")]);

        assert_eq!(
            response.data,
            json!({
                "photo": null,
                "todo": { "id": "xyz", "title": "I am a manually mocked todo!" },
            })
        );
    });
}

#[test]
fn adds_additional_mocks() {
    runtime().block_on(async {
        let mut network = network(default_mocks());

        network.add_mocks(MockLayer::new().with_mock(
            "Query",
            Mock::from_fn(|_| {
                Mock::fields([(
                    "photo",
                    Mock::from_fn(|_| json!({ "id": "abc", "title": "I am a manually mocked photo!" })),
                )])
            }),
        ));

        let response = network.query(PHOTO_QUERY, variables!({ "id": 1 })).await;

        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "photo": {
              "id": "abc",
              "title": "I am a manually mocked photo!"
            }
          }
        }
        "###);
    });
}

#[test]
fn preserves_previous_mocks_when_adding_new_ones() {
    runtime().block_on(async {
        let mut network = network(default_mocks());

        network.add_mocks(MockLayer::new().with_field_mock(
            "Query",
            "photo",
            json!({ "id": "abc", "title": "I am a manually mocked photo!" }),
        ));
        network.add_mocks(MockLayer::new().with_mock("Status", Mock::value("COMPLETED")));

        let response = network.query(TODO_QUERY, variables!({ "id": 1 })).await;
        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "todo": {
              "id": "xyz",
              "title": "I am a manually mocked todo!"
            }
          }
        }
        "###);

        let response = network.query(PHOTO_QUERY, variables!({ "id": 1 })).await;
        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "photo": {
              "id": "abc",
              "title": "I am a manually mocked photo!"
            }
          }
        }
        "###);
    });
}

#[test]
fn reset_restores_the_original_mocks() {
    runtime().block_on(async {
        let defaults = default_mocks();
        let mut network = network(defaults.clone());

        let before = network.query(PHOTO_QUERY, variables!({ "id": 1 })).await;

        network.add_mocks(MockLayer::new().with_field_mock(
            "Query",
            "photo",
            json!({ "id": "abc", "title": "I am a manually mocked photo!" }),
        ));
        network.add_mocks(MockLayer::new().with_field_mock("Query", "todo", json!(null)));
        network.reset_mocks();

        assert_eq!(network.mocks(), &defaults);

        let after = network.query(PHOTO_QUERY, variables!({ "id": 1 })).await;
        assert_eq!(
            serde_json::to_string(&before).unwrap(),
            serde_json::to_string(&after).unwrap()
        );
        assert_ne!(after.data["photo"]["id"], json!("abc"));

        let response = network.query(TODO_QUERY, variables!({ "id": 1 })).await;
        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "todo": {
              "id": "xyz",
              "title": "I am a manually mocked todo!"
            }
          }
        }
        "###);
    });
}

#[test]
fn producers_receive_field_arguments() {
    runtime().block_on(async {
        let network = network(MockLayer::new().with_field_mock(
            "Query",
            "todo",
            Mock::from_fn(|arguments| {
                json!({
                    "id": arguments["id"],
                    "title": format!("todo {}", arguments["id"].as_str().unwrap_or_default()),
                })
            }),
        ));

        let response = network.query(TODO_QUERY, variables!({ "id": "42" })).await;

        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "todo": {
              "id": "42",
              "title": "todo 42"
            }
          }
        }
        "###);
    });
}

#[test]
fn nested_producers_receive_their_own_arguments() {
    runtime().block_on(async {
        let seen = Arc::new(Mutex::new(Vec::<Arguments>::new()));

        let title = {
            let seen = seen.clone();
            Mock::from_fn(move |arguments| {
                seen.lock().unwrap().push(arguments.clone());

                if arguments.get("uppercase") == Some(&json!(true)) {
                    json!("NESTED")
                } else {
                    json!("nested")
                }
            })
        };

        let network = network(MockLayer::new().with_field_mock(
            "Query",
            "todo",
            Mock::from_fn(move |_| Mock::fields([("title", title.clone())])),
        ));

        let response = network
            .query(r#"{ todo(id: "1") { title(uppercase: true) } }"#, Default::default())
            .await;

        assert_eq!(response.data, json!({ "todo": { "title": "NESTED" } }));
        assert_eq!(seen.lock().unwrap().as_slice(), [variables!({ "uppercase": true })]);
    });
}

#[test]
fn field_mocks_win_over_type_mocks() {
    runtime().block_on(async {
        let network = network(
            MockLayer::new()
                .with_mock("String", Mock::value("from the type"))
                .with_mock("Todo", Mock::value(json!({ "completed": true, "title": "from Todo" })))
                .with_field_mock("Query", "todo", json!({ "title": "from the field" })),
        );

        let response = network
            .query(
                r#"{
                    todo(id: "1") { title completed }
                    photo(id: "1") { title url }
                }"#,
                Default::default(),
            )
            .await;

        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "todo": {
              "title": "from the field",
              "completed": true
            },
            "photo": {
              "title": "from the type",
              "url": "from the type"
            }
          }
        }
        "###);
    });
}

#[test]
fn abstract_types_follow_the_mocked_typename() {
    runtime().block_on(async {
        let network = network(
            MockLayer::new()
                .with_field_mock("Query", "node", json!({ "__typename": "Photo", "url": "http://url.com" }))
                .with_field_mock(
                    "Query",
                    "search",
                    json!([
                        { "__typename": "Photo", "title": "a photo" },
                        { "__typename": "Todo", "title": "a todo" },
                    ]),
                ),
        );

        let response = network
            .query(
                r#"{
                    node(id: "1") { __typename ... on Photo { url } }
                    search(term: "a") {
                        __typename
                        ... on Photo { title }
                        ... on Todo { title }
                    }
                }"#,
                Default::default(),
            )
            .await;

        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "node": {
              "__typename": "Photo",
              "url": "http://url.com"
            },
            "search": [
              {
                "__typename": "Photo",
                "title": "a photo"
              },
              {
                "__typename": "Todo",
                "title": "a todo"
              }
            ]
          }
        }
        "###);
    });
}

#[test]
fn explicit_null() {
    runtime().block_on(async {
        let network = network(MockLayer::new().with_field_mock("Query", "todo", json!(null)));

        let response = network.query(TODO_QUERY, variables!({ "id": 1 })).await;

        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "todo": null
          }
        }
        "###);
    });
}

#[test]
fn wrongly_shaped_mocks_are_field_errors() {
    runtime().block_on(async {
        let network = network(
            MockLayer::new()
                .with_field_mock("Query", "todos", json!("not a list"))
                .with_field_mock("Query", "photo", json!({ "title": { "nested": true } })),
        );

        let response = network.query("{ todos { id } }", Default::default()).await;

        assert_eq!(response.data, json!(null));
        assert_eq!(response.errors.len(), 1);
        assert!(
            response.errors[0].message.starts_with("expected a list"),
            "{}",
            response.errors[0].message
        );

        let response = network.query(r#"{ photo(id: "1") { title } }"#, Default::default()).await;

        assert_eq!(response.data, json!({ "photo": { "title": null } }));
        assert_eq!(response.errors.len(), 1);
    });
}

#[test]
fn unknown_mock_keys_are_ignored() {
    runtime().block_on(async {
        let network = network(
            default_mocks()
                .with_mock("Unknown", Mock::value(json!({ "whatever": 1 })))
                .with_field_mock("Query", "notAField", json!(1)),
        );

        let response = network.query(TODO_QUERY, variables!({ "id": 1 })).await;

        assert!(response.is_ok(), "{response:?}");
        assert_eq!(response.data["todo"]["id"], json!("xyz"));
    });
}

#[test]
fn failing_producers_can_depend_on_arguments() {
    runtime().block_on(async {
        let network = network(MockLayer::new().with_field_mock(
            "Query",
            "photo",
            Mock::try_from_fn(|arguments| match arguments["id"].as_str() {
                Some("missing") => Err(MockError::new("photo missing not found")),
                id => Ok(json!({ "id": id, "title": "found" })),
            }),
        ));

        let response = network
            .query(
                r#"{
                    found: photo(id: "1") { id title }
                    missing: photo(id: "missing") { id title }
                }"#,
                Default::default(),
            )
            .await;

        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "found": {
              "id": "1",
              "title": "found"
            },
            "missing": null
          },
          "errors": [
            {
              "message": "photo missing not found",
              "locations": [
                {
                  "line": 3,
                  "column": 21
                }
              ],
              "path": [
                "missing"
              ]
            }
          ]
        }
        "###);
    });
}

#[test]
fn failing_non_null_fields_null_their_parent() {
    runtime().block_on(async {
        let network = network(MockLayer::new().with_field_mock(
            "Query",
            "todo",
            Mock::fields([("id", Mock::error("no id for you"))]),
        ));

        let response = network
            .query(
                r#"{
                    todo(id: "1") { id title }
                    photo(id: "1") { url }
                }"#,
                Default::default(),
            )
            .await;

        assert_eq!(
            response.data,
            json!({ "todo": null, "photo": { "url": "Hello World" } })
        );
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].message, "no id for you");
        assert_eq!(response.errors[0].path, [json!("todo"), json!("id")]);
    });
}

#[test]
fn nulls_propagate_through_non_null_lists() {
    runtime().block_on(async {
        let network = network(MockLayer::new().with_mock(
            "Todo",
            Mock::fields([("id", Mock::error("no id for you"))]),
        ));

        let response = network
            .query(r#"{ todos { id } photo(id: "1") { url } }"#, Default::default())
            .await;

        assert_eq!(response.data, json!(null));
        assert_eq!(response.errors.len(), 2);
        assert!(
            response
                .errors
                .iter()
                .any(|error| error.path == [json!("todos"), json!(0), json!("id")]),
            "{response:?}"
        );

        let response = network.query(r#"{ node(id: "1") { id } }"#, Default::default()).await;

        assert_eq!(response.data, json!({ "node": null }));
        assert_eq!(response.errors[0].path, [json!("node"), json!("id")]);
    });
}
