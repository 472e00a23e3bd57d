use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::connectors::search::{SearchHit, WebSearchConnector};
use crate::mcp::errors::ToolError;
use crate::mcp::protocol::ToolContent;
use crate::mcp::registry::ToolHandler;
use crate::mcp::schema::{ParamField, ParamKind, ParamSchema, ValidatedParams};

/// Per-provider limits on the `count` parameter.
#[derive(Debug, Clone, Copy)]
pub struct ResultLimits {
    pub max: i64,
    pub default: i64,
}

/// Web search through one provider. The same handler serves every provider;
/// only the collaborator and the result limits differ.
pub struct WebSearchTool {
    search: Arc<dyn WebSearchConnector>,
}

impl WebSearchTool {
    pub const BRAVE: &'static str = "brave-web-search";
    pub const BRAVE_DESCRIPTION: &'static str =
        "Search the web with Brave Search and return titles, URLs and snippets";
    pub const BRAVE_LIMITS: ResultLimits = ResultLimits {
        max: 20,
        default: 10,
    };

    pub const TAVILY: &'static str = "tavily-web-search";
    pub const TAVILY_DESCRIPTION: &'static str =
        "Search the web with Tavily and return titles, URLs and snippets";
    pub const TAVILY_LIMITS: ResultLimits = ResultLimits { max: 10, default: 5 };

    pub fn new(search: Arc<dyn WebSearchConnector>) -> Self {
        Self { search }
    }

    pub fn schema(limits: ResultLimits) -> ParamSchema {
        ParamSchema::new()
            .field(ParamField::new(
                "query",
                "Search query",
                ParamKind::non_empty_string(),
            ))
            .field(
                ParamField::new(
                    "count",
                    "Number of results to return",
                    ParamKind::integer_range(1, limits.max),
                )
                .with_default(limits.default),
            )
    }
}

fn format_hits(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No results found for \"{}\"", query);
    }

    let mut text = format!("Search results for \"{}\":\n", query);
    for (index, hit) in hits.iter().enumerate() {
        text.push_str(&format!("\n{}. {}\n   {}\n", index + 1, hit.title, hit.url));
        if !hit.snippet.is_empty() {
            text.push_str(&format!("   {}\n", hit.snippet));
        }
    }
    text.trim_end().to_string()
}

#[async_trait]
impl ToolHandler for WebSearchTool {
    async fn execute(&self, params: ValidatedParams) -> Result<ToolContent, ToolError> {
        #[derive(Deserialize)]
        struct Args {
            query: String,
            count: u32,
        }

        let args: Args = params
            .parse()
            .map_err(|e| ToolError::new(format!("Invalid arguments: {}", e)))?;

        let text = match self.search.search(&args.query, args.count).await {
            Some(hits) => format_hits(&args.query, &hits),
            None => format!("Unable to retrieve search results for \"{}\"", args.query),
        };

        Ok(ToolContent::text(text))
    }
}
