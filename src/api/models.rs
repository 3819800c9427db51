use crate::api::ModelsResponse;
use crate::utils::url::construct_api_url;

/// Fetch the model list from the server's enhanced REST endpoint.
///
/// The local server needs no authentication, so this is a plain GET.
pub async fn fetch_models(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<ModelsResponse, Box<dyn std::error::Error>> {
    let models_url = construct_api_url(base_url, "api/v0/models");
    let response = client
        .get(models_url)
        .header("Content-Type", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(format!("API request failed with status {status}: {error_text}").into());
    }

    let models_response = response.json::<ModelsResponse>().await?;
    Ok(models_response)
}

/// Ids of the models a chat can target, in server order.
pub fn selectable_model_ids(models: &ModelsResponse) -> Vec<String> {
    models
        .data
        .iter()
        .filter(|m| m.is_selectable())
        .map(|m| m.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ModelsResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn filters_to_loaded_llms() {
        let response = parse(
            r#"{"data":[
                {"id":"m1","type":"llm","state":"loaded"},
                {"id":"m2","type":"llm","state":"unloaded"}
            ]}"#,
        );
        assert_eq!(selectable_model_ids(&response), vec!["m1".to_string()]);
    }

    #[test]
    fn embedding_models_are_never_selectable() {
        let response = parse(
            r#"{"data":[
                {"id":"text-embedding-nomic","type":"embeddings","state":"loaded"},
                {"id":"chat-model","type":"llm","state":"loaded"}
            ]}"#,
        );
        assert_eq!(
            selectable_model_ids(&response),
            vec!["chat-model".to_string()]
        );
    }

    #[test]
    fn ignores_extra_fields_from_the_server() {
        // The server reports more metadata than we consume
        let response = parse(
            r#"{"data":[{
                "id":"m1",
                "type":"llm",
                "state":"loaded",
                "publisher":"meta",
                "max_context_length":131072
            }]}"#,
        );
        assert_eq!(selectable_model_ids(&response), vec!["m1".to_string()]);
    }

    #[test]
    fn preserves_server_order() {
        let response = parse(
            r#"{"data":[
                {"id":"b","type":"llm","state":"loaded"},
                {"id":"a","type":"llm","state":"loaded"}
            ]}"#,
        );
        assert_eq!(
            selectable_model_ids(&response),
            vec!["b".to_string(), "a".to_string()]
        );
    }
}
