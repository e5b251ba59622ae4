use habit_service::config::HabitConfig;
use habit_service::scheduler::ReminderScheduler;
use habit_service::services::HabitStore;
use habit_service::startup::Application;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<dyn HabitStore>,
    pub scheduler: Arc<ReminderScheduler>,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn the service on a random port backed by the in-memory store.
    pub async fn spawn() -> Self {
        Self::spawn_with(HabitConfig::for_tests()).await
    }

    pub async fn spawn_with(config: HabitConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let store = app.store();
        let scheduler = app.scheduler();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            store,
            scheduler,
            client,
        }
    }

    pub async fn create_habit(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/habits", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn complete_habit(&self, id: &str, body: serde_json::Value) -> reqwest::Response {
        self.client
            .put(format!("{}/habits/{}", self.address, id))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Create a habit and return its id.
    pub async fn seed_habit(&self, name: &str, daily_goal: i64) -> String {
        let response = self
            .create_habit(serde_json::json!({ "name": name, "dailyGoal": daily_goal }))
            .await;
        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        body["habit"]["id"]
            .as_str()
            .expect("Missing habit id")
            .to_string()
    }
}
