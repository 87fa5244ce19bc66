use graphql_mock_network::{Mock, MockLayer, MockNetwork, MockNetworkConfig};
use serde_json::{json, Value};

use crate::{data_path, network, runtime, schema, PHOTO_QUERY, TODO_QUERY};

const EVERY_TODO_FIELD: &str = r#"
    query todo($id: ID!) {
        todo(id: $id) {
            id
            title
            completed
            status
            priority
            progress
            tags
        }
    }
"#;

#[test]
fn unmocked_fields_get_type_correct_values() {
    runtime().block_on(async {
        let network = network(MockLayer::new());

        let response = network.query(EVERY_TODO_FIELD, variables!({ "id": 1 })).await;
        assert!(response.is_ok(), "{response:?}");

        let todo = &response.data["todo"];

        assert!(uuid_like(&todo["id"]), "{todo}");
        assert_eq!(todo["title"], json!("Hello World"));
        assert!(todo["completed"].is_boolean(), "{todo}");
        assert_eq!(todo["status"], json!("ACTIVE"));

        let priority = todo["priority"].as_i64().unwrap();
        assert!((-100..=100).contains(&priority), "{priority}");

        let progress = todo["progress"].as_f64().unwrap();
        assert!((-100.0..=100.0).contains(&progress), "{progress}");

        assert_eq!(todo["tags"], json!(["Hello World", "Hello World"]));
    });
}

#[test]
fn custom_scalars_default_to_strings() {
    runtime().block_on(async {
        let network = network(MockLayer::new());

        let response = network.query(r#"{ photo(id: "1") { takenAt } }"#, Default::default()).await;

        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "photo": {
              "takenAt": "Hello World"
            }
          }
        }
        "###);
    });
}

#[test]
fn generated_values_are_deterministic() {
    runtime().block_on(async {
        let first = network(MockLayer::new());
        let second = network(MockLayer::new());

        let query = "{ todos { id priority progress completed } }";

        let response = first.query(query, Default::default()).await;
        assert_eq!(response, first.query(query, Default::default()).await);
        assert_eq!(response, second.query(query, Default::default()).await);

        let todos = response.data["todos"].as_array().unwrap();
        assert_eq!(todos.len(), 2);
        assert_ne!(todos[0]["id"], todos[1]["id"]);
    });
}

#[test]
fn auto_mocking_is_kept_next_to_manual_mocks() {
    runtime().block_on(async {
        let network = network(MockLayer::new().with_mock(
            "Query",
            Mock::from_fn(|_| {
                Mock::fields([(
                    "todo",
                    Mock::from_fn(|_| json!({ "id": "xyz", "title": "I am manually mocked!" })),
                )])
            }),
        ));

        let response = network.query(PHOTO_QUERY, variables!({ "id": 1 })).await;

        assert!(response.data["photo"]["id"].is_string(), "{response:?}");
        assert_eq!(response.data["photo"]["title"], json!("Hello World"));

        let response = network.query(TODO_QUERY, variables!({ "id": 1 })).await;

        assert_eq!(
            response.data,
            json!({ "todo": { "id": "xyz", "title": "I am manually mocked!" } })
        );
    });
}

#[test]
fn abstract_types_default_to_their_first_possible_type() {
    runtime().block_on(async {
        let network = network(MockLayer::new());

        let response = network
            .query(
                r#"{
                    node(id: "1") { __typename }
                    search(term: "a") { __typename }
                }"#,
                Default::default(),
            )
            .await;

        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "node": {
              "__typename": "Todo"
            },
            "search": [
              {
                "__typename": "Todo"
              },
              {
                "__typename": "Todo"
              }
            ]
          }
        }
        "###);
    });
}

#[test]
fn abstract_type_mocks_pick_the_concrete_type() {
    runtime().block_on(async {
        let network = network(
            MockLayer::new()
                .with_mock("Node", Mock::value(json!({ "__typename": "Photo" })))
                .with_mock("Photo", Mock::value(json!({ "url": "http://url.com" }))),
        );

        let response = network
            .query(r#"{ node(id: "1") { __typename ... on Photo { url } } }"#, Default::default())
            .await;

        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "node": {
              "__typename": "Photo",
              "url": "http://url.com"
            }
          }
        }
        "###);
    });
}

#[test]
fn list_length_comes_from_the_configuration() {
    runtime().block_on(async {
        let config = MockNetworkConfig::load(data_path("mock-network.toml")).unwrap();
        let network = MockNetwork::from_config(&config, MockLayer::new()).unwrap();

        let response = network.query("{ todos { tags } }", Default::default()).await;

        let todos = response.data["todos"].as_array().unwrap();
        assert_eq!(todos.len(), 3);
        assert_eq!(todos[0]["tags"].as_array().map(Vec::len), Some(3));
    });
}

#[test]
fn list_length_from_the_builder() {
    runtime().block_on(async {
        let network = MockNetwork::builder(schema()).list_length(0).build().unwrap();

        let response = network.query("{ todos { id } }", Default::default()).await;

        assert_eq!(response.data, json!({ "todos": [] }));
    });
}

fn uuid_like(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|id| id.len() == 36 && id.chars().filter(|c| *c == '-').count() == 4)
}
