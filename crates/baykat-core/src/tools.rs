//! Tool registry and the per-topic lookup tools
//!
//! Every tool returns a JSON string for the model to read. "Not found" is
//! reported inside the JSON (`{"error": ...}`) so the model can answer
//! gracefully; only transport failures surface as `Err`.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::ToolDefinition;
use crate::data;
use crate::weather::{WeatherService, format_weather_code};

/// Trait for executing tools
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, tool_name: &str, input: Value) -> Result<String>;
    fn list_tools(&self) -> Vec<ToolDefinition>;
}

/// Individual tool handler
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn input_schema(&self) -> Value;
    async fn execute(&self, input: Value) -> Result<String>;
}

/// Registry of available tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        let name = handler.name().to_string();
        debug!("Registering tool: {}", name);
        self.tools.insert(name, handler);
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    async fn execute(&self, tool_name: &str, input: Value) -> Result<String> {
        debug!("Executing tool: {} with input: {:?}", tool_name, input);

        let handler = self
            .tools
            .get(tool_name)
            .ok_or_else(|| anyhow!("Unknown tool: {}", tool_name))?;

        match handler.execute(input).await {
            Ok(result) => {
                debug!("Tool {} succeeded", tool_name);
                Ok(result)
            }
            Err(e) => {
                warn!("Tool {} failed: {}", tool_name, e);
                Err(e)
            }
        }
    }

    fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|handler| ToolDefinition {
                name: handler.name().to_string(),
                description: handler.description().to_string(),
                input_schema: handler.input_schema(),
            })
            .collect()
    }
}

/// Helper function to create a JSON schema for tool input
pub fn json_schema(properties: Value, required: Vec<&str>) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn required_str<'a>(input: &'a Value, key: &str) -> Result<&'a str> {
    input
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("Missing '{}' parameter", key))
}

// ── Weather tools ────────────────────────────────────────

/// 7-day forecast lookup backed by Open-Meteo.
pub struct ForecastTool {
    weather: Arc<WeatherService>,
}

impl ForecastTool {
    pub fn new(weather: Arc<WeatherService>) -> Self {
        Self { weather }
    }
}

#[async_trait]
impl ToolHandler for ForecastTool {
    fn name(&self) -> &str {
        "get_forecast"
    }

    fn description(&self) -> &str {
        "Get 7-day weather forecast for a Senegalese city. Returns temperature, precipitation, wind data."
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "city": {
                    "type": "string",
                    "description": "City name in Senegal (e.g., dakar, kaolack, saint-louis, ziguinchor, touba)"
                }
            }),
            vec!["city"],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let city = required_str(&input, "city")?;
        let forecast = self.weather.forecast(city).await?;
        Ok(serde_json::to_string(&forecast)?)
    }
}

/// WMO weather code to French/Wolof text.
pub struct WeatherCodeTool;

#[async_trait]
impl ToolHandler for WeatherCodeTool {
    fn name(&self) -> &str {
        "interpret_weather_code"
    }

    fn description(&self) -> &str {
        "Convert a WMO weather code number into human-readable description in French and Wolof."
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "code": {
                    "type": "integer",
                    "description": "WMO weather code number"
                }
            }),
            vec!["code"],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let code = input
            .get("code")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| anyhow!("Missing 'code' parameter"))?;
        Ok(serde_json::to_string(&format_weather_code(code as u32))?)
    }
}

// ── Agro tools ────────────────────────────────────────

/// Crop sheet lookup: varieties, calendar, soil, advice.
pub struct CropInfoTool;

#[async_trait]
impl ToolHandler for CropInfoTool {
    fn name(&self) -> &str {
        "get_crop_info"
    }

    fn description(&self) -> &str {
        "Get detailed information about a crop grown in Senegal: varieties, calendar, soil, water needs, tips."
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "crop_name": {
                    "type": "string",
                    "description": "Crop name in French or Wolof (e.g., arachide/gerte, mil/dugub, riz/malo, tomate/tamaate)"
                }
            }),
            vec!["crop_name"],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let name = required_str(&input, "crop_name")?;
        match data::get_crop(name) {
            Some(crop) => Ok(serde_json::to_string(crop)?),
            None => Ok(serde_json::to_string(&serde_json::json!({
                "error": format!(
                    "Culture inconnue: {}. Cultures disponibles: arachide, mil, riz, mais, niebe, tomate, oignon",
                    name
                )
            }))?),
        }
    }
}

/// Disease and pest lookup for a crop, optionally narrowed by symptoms.
pub struct DiagnoseTool;

#[async_trait]
impl ToolHandler for DiagnoseTool {
    fn name(&self) -> &str {
        "diagnose_disease"
    }

    fn description(&self) -> &str {
        "Get diseases and pests that affect a specific crop, with symptoms, treatments, and prevention."
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "crop_name": {
                    "type": "string",
                    "description": "The crop to diagnose (e.g., arachide, tomate, riz)"
                },
                "symptoms": {
                    "type": "string",
                    "description": "Optional: symptoms described by the farmer to narrow diagnosis"
                }
            }),
            vec!["crop_name"],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let crop = required_str(&input, "crop_name")?;
        let symptoms = input.get("symptoms").and_then(|v| v.as_str());

        let diseases = data::diseases_for_crop(crop);
        if diseases.is_empty() {
            return Ok(serde_json::to_string(&serde_json::json!({
                "error": format!("Pas de maladies repertoriees pour: {}", crop)
            }))?);
        }

        Ok(serde_json::to_string(&serde_json::json!({
            "crop": crop,
            "diseases": diseases,
            "symptoms_query": symptoms,
        }))?)
    }
}

/// Agro-ecological zone sheet.
pub struct ZoneInfoTool;

#[async_trait]
impl ToolHandler for ZoneInfoTool {
    fn name(&self) -> &str {
        "get_zone_info"
    }

    fn description(&self) -> &str {
        "Get information about an agro-ecological zone of Senegal: climate, soils, crops, challenges."
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "zone_name": {
                    "type": "string",
                    "description": "Zone name: niayes, bassin_arachidier, casamance, vallee_fleuve, sylvopastorale, senegal_oriental"
                }
            }),
            vec!["zone_name"],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let name = required_str(&input, "zone_name")?;
        match data::get_zone(name) {
            Some(zone) => Ok(serde_json::to_string(zone)?),
            None => Ok(serde_json::to_string(&serde_json::json!({
                "error": format!("Zone inconnue: {}", name)
            }))?),
        }
    }
}

// ── Market tools ────────────────────────────────────────

/// Price table for one crop across cities.
pub struct CropPricesTool;

#[async_trait]
impl ToolHandler for CropPricesTool {
    fn name(&self) -> &str {
        "get_crop_prices"
    }

    fn description(&self) -> &str {
        "Get current market prices for a crop across Senegalese cities. Returns min, max, average price in FCFA/kg and trend."
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "crop_name": {
                    "type": "string",
                    "description": "Crop name (e.g., arachide, mil, riz, mais, niebe, tomate, oignon)"
                }
            }),
            vec!["crop_name"],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let name = required_str(&input, "crop_name")?;
        match data::get_prices(name) {
            Some(prices) => Ok(serde_json::to_string(prices)?),
            None => Ok(serde_json::to_string(&serde_json::json!({
                "error": format!(
                    "Pas de prix pour: {}. Produits disponibles: arachide, mil, riz, mais, niebe, tomate, oignon",
                    name
                )
            }))?),
        }
    }
}

/// Markets of one city with their products.
pub struct CityMarketsTool;

#[async_trait]
impl ToolHandler for CityMarketsTool {
    fn name(&self) -> &str {
        "get_city_markets"
    }

    fn description(&self) -> &str {
        "Get list of markets in a specific city with their products."
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "city": {
                    "type": "string",
                    "description": "City name (e.g., dakar, kaolack, touba, saint-louis)"
                }
            }),
            vec!["city"],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let city = required_str(&input, "city")?;
        let markets = data::markets_for_city(city);
        if markets.is_empty() {
            return Ok(serde_json::to_string(&serde_json::json!({
                "error": format!("Pas de marchés pour: {}", city)
            }))?);
        }

        Ok(serde_json::to_string(&serde_json::json!({
            "city": city,
            "markets": markets,
        }))?)
    }
}

/// Where a crop sells best: cities ranked by average price.
pub struct ComparePricesTool;

#[async_trait]
impl ToolHandler for ComparePricesTool {
    fn name(&self) -> &str {
        "compare_prices"
    }

    fn description(&self) -> &str {
        "Compare prices of a crop across all available cities to find the best place to sell."
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "crop_name": {
                    "type": "string",
                    "description": "Crop name to compare prices for"
                }
            }),
            vec!["crop_name"],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let name = required_str(&input, "crop_name")?;
        let Some(prices) = data::get_prices(name) else {
            return Ok(serde_json::to_string(&serde_json::json!({
                "error": format!("Pas de prix pour: {}", name)
            }))?);
        };

        let mut comparison: Vec<&data::CityPrice> = prices.prices_by_city.iter().collect();
        comparison.sort_by(|a, b| b.avg.cmp(&a.avg));

        Ok(serde_json::to_string(&serde_json::json!({
            "crop": prices.crop,
            "trend": prices.trend,
            "comparison": comparison,
            "recommendation_fr": prices.season_note_fr,
            "recommendation_wo": prices.season_note_wo,
        }))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DummyTool;

    #[async_trait]
    impl ToolHandler for DummyTool {
        fn name(&self) -> &str {
            "dummy"
        }

        fn description(&self) -> &str {
            "A dummy tool for testing"
        }

        fn input_schema(&self) -> Value {
            json_schema(
                serde_json::json!({
                    "message": {
                        "type": "string",
                        "description": "Test message"
                    }
                }),
                vec!["message"],
            )
        }

        async fn execute(&self, _input: Value) -> Result<String> {
            Ok("dummy result".to_string())
        }
    }

    #[tokio::test]
    async fn test_tool_registry() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(DummyTool));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.list_tools()[0].name, "dummy");

        let result = registry
            .execute("dummy", serde_json::json!({"message": "test"}))
            .await;
        assert_eq!(result.unwrap(), "dummy result");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::new();
        let result = registry.execute("nonexistent", serde_json::json!({})).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_crop_info_known_and_unknown() {
        let tool = CropInfoTool;
        let out = tool
            .execute(serde_json::json!({"crop_name": "gerte"}))
            .await
            .unwrap();
        assert!(out.contains("\"key\":\"arachide\""));

        let out = tool
            .execute(serde_json::json!({"crop_name": "banane"}))
            .await
            .unwrap();
        assert!(out.contains("Culture inconnue"));
    }

    #[tokio::test]
    async fn test_crop_info_missing_parameter() {
        let tool = CropInfoTool;
        assert!(tool.execute(serde_json::json!({})).await.is_err());
    }

    #[tokio::test]
    async fn test_diagnose_echoes_symptoms() {
        let tool = DiagnoseTool;
        let out = tool
            .execute(serde_json::json!({
                "crop_name": "tomate",
                "symptoms": "feuilles collantes"
            }))
            .await
            .unwrap();
        assert!(out.contains("Mouche blanche"));
        assert!(out.contains("feuilles collantes"));
    }

    #[tokio::test]
    async fn test_compare_prices_sorted_by_avg_desc() {
        let tool = ComparePricesTool;
        let out = tool
            .execute(serde_json::json!({"crop_name": "arachide"}))
            .await
            .unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        let comparison = parsed["comparison"].as_array().unwrap();
        let avgs: Vec<u64> = comparison
            .iter()
            .map(|c| c["avg"].as_u64().unwrap())
            .collect();
        let mut sorted = avgs.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(avgs, sorted);
        assert_eq!(comparison[0]["city"], "dakar");
    }

    #[tokio::test]
    async fn test_city_markets_unknown_city() {
        let tool = CityMarketsTool;
        let out = tool
            .execute(serde_json::json!({"city": "matam"}))
            .await
            .unwrap();
        assert!(out.contains("Pas de marchés"));
    }

    #[tokio::test]
    async fn test_weather_code_tool() {
        let tool = WeatherCodeTool;
        let out = tool.execute(serde_json::json!({"code": 95})).await.unwrap();
        assert!(out.contains("Orage"));
    }

    #[tokio::test]
    async fn test_forecast_tool_rejects_unknown_city_before_network() {
        let tool = ForecastTool::new(Arc::new(WeatherService::new()));
        let result = tool.execute(serde_json::json!({"city": "paris"})).await;
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Ville inconnue"));
    }
}
