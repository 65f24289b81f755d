use crate::config::types::{Config, CrawlerConfig, HttpConfig, OutputConfig, SourceConfig, SourceKind};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Upper limit for `max-chapters`
pub const MAX_CHAPTERS_LIMIT: u32 = 10_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_source_config(&config.source)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.start_page < 1 {
        return Err(ConfigError::Validation(format!(
            "start-page must be >= 1, got {}",
            config.start_page
        )));
    }

    if config.end_page < config.start_page {
        return Err(ConfigError::Validation(format!(
            "end-page ({}) must not be smaller than start-page ({})",
            config.end_page, config.start_page
        )));
    }

    if config.concurrency < 1 || config.concurrency > 32 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 32, got {}",
            config.concurrency
        )));
    }

    if config.max_chapters < 1 || config.max_chapters > MAX_CHAPTERS_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max-chapters must be between 1 and {}, got {}",
            MAX_CHAPTERS_LIMIT, config.max_chapters
        )));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 || config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeouts must be >= 1s, got timeout-secs={} connect-timeout-secs={}",
            config.timeout_secs, config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Validates the catalog source for the selected backend
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    match config.kind {
        SourceKind::Html => {
            if !config.list_url.contains("{page}") {
                return Err(ConfigError::Validation(format!(
                    "list-url must contain a {{page}} placeholder, got '{}'",
                    config.list_url
                )));
            }

            validate_http_url(&config.list_url.replace("{page}", "1"), "list-url")?;

            if !config.chapter_url.contains("{index}") {
                return Err(ConfigError::Validation(format!(
                    "chapter-url must contain an {{index}} placeholder, got '{}'",
                    config.chapter_url
                )));
            }

            let selectors = &config.selectors;
            for (field, list) in [
                ("item-link", &selectors.item_link),
                ("title", &selectors.title),
                ("author", &selectors.author),
                ("description", &selectors.description),
                ("thumbnail", &selectors.thumbnail),
                ("chapter-image", &selectors.chapter_image),
            ] {
                if list.is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "selectors.{} needs at least one selector",
                        field
                    )));
                }
            }
            for selector in [
                &selectors.item_link,
                &selectors.title,
                &selectors.author,
                &selectors.description,
                &selectors.thumbnail,
                &selectors.chapter_image,
                &selectors.chapter_list,
            ]
            .into_iter()
            .flat_map(|list| list.iter())
            {
                validate_selector(selector)?;
            }
        }
        SourceKind::Api => {
            let base = config.api_base.as_deref().ok_or_else(|| {
                ConfigError::Validation("api-base is required for the api source".to_string())
            })?;
            validate_http_url(base, "api-base")?;
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    if matches!(&config.summary_path, Some(p) if p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "summary-path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

/// Checks that a CSS selector parses
fn validate_selector(selector: &str) -> Result<(), ConfigError> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector {
            selector: selector.to_string(),
            message: format!("{:?}", e),
        })
}

/// Checks that a URL parses and uses http(s)
fn validate_http_url(value: &str, field: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}
