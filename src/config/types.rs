use serde::Deserialize;

/// Main configuration structure for Story-Harvest
///
/// Every section has defaults, so an empty file (or no file at all) yields
/// a runnable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub publish: PublishConfig,
}

/// How the chapter probe loop is bounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChapterBound {
    /// Probe until the first gap, never beyond `max-chapters`
    #[default]
    Cap,

    /// Probe up to the chapter count advertised by the source
    KnownCount,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// First listing page (inclusive)
    pub start_page: u32,

    /// Last listing page (inclusive)
    pub end_page: u32,

    /// Number of items of one page processed at the same time
    pub concurrency: u32,

    /// Hard cap on chapter probes per item
    pub max_chapters: u32,

    /// Bounding strategy for the chapter probe loop
    pub chapter_bound: ChapterBound,

    /// Maximum number of item references processed in the whole run
    pub max_items: Option<usize>,

    /// Pause after each item (milliseconds)
    pub item_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_page: 4,
            end_page: 14,
            concurrency: 1,
            max_chapters: 100,
            chapter_bound: ChapterBound::Cap,
            max_items: None,
            item_delay_ms: 0,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    pub user_agent: String,
    pub accept_language: String,

    /// Whole-request timeout (seconds)
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120 Safari/537.36"
                .to_string(),
            accept_language: "vi-VN,vi;q=0.9,en;q=0.8".to_string(),
            timeout_secs: 20,
            connect_timeout_secs: 10,
        }
    }
}

/// Which backend reads the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Scrape listing, detail and chapter pages with CSS selectors
    #[default]
    Html,

    /// Read a JSON catalog API
    Api,
}

/// Catalog source configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SourceConfig {
    pub kind: SourceKind,

    /// Listing page URL template, `{page}` is replaced by the page index
    pub list_url: String,

    /// Chapter URL template with `{item}` and `{index}` placeholders
    pub chapter_url: String,

    /// Body text that marks a chapter as not yet published
    pub empty_markers: Vec<String>,

    /// Base URL of the catalog API (api backend)
    pub api_base: Option<String>,

    /// Bearer token for the catalog API
    pub api_key: Option<String>,

    pub selectors: SelectorConfig,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Html,
            list_url: "https://nettruyen0209.com/danh-sach-truyen/{page}/?sort=last_update&status=0"
                .to_string(),
            chapter_url: "{item}/chapter-{index}".to_string(),
            empty_markers: vec!["Truyện đang cập nhật".to_string()],
            api_base: None,
            api_key: None,
            selectors: SelectorConfig::default(),
        }
    }
}

/// CSS selectors used by the html backend
///
/// Every entry takes a single selector or an ordered list; the first
/// selector that yields a value wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SelectorConfig {
    /// Anchors on a listing page that point at item detail pages
    pub item_link: SelectorList,
    pub title: SelectorList,
    pub author: SelectorList,
    pub description: SelectorList,

    /// Image element holding the cover
    pub thumbnail: SelectorList,

    /// Image elements of a chapter page
    pub chapter_image: SelectorList,

    /// Chapter anchors on a detail page, used to learn the chapter count.
    /// Empty turns the count off.
    pub chapter_list: SelectorList,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            item_link: SelectorList::from(".col-truyen-list .list-truyen-item a"),
            title: SelectorList::new(["h1.title-detail", "h1"]),
            author: SelectorList::new([".author span", "p.author a"]),
            description: SelectorList::new([
                ".summary_content",
                ".detail-content",
                ".summary",
                ".desc",
                "#tab-summary",
            ]),
            thumbnail: SelectorList::new([
                ".info-image img",
                ".col-image img",
                ".book img",
                "img[itemprop='image']",
                ".thumb img",
            ]),
            chapter_image: SelectorList::new([
                ".reading-detail img",
                ".chapter-content img",
                ".page-chapter img",
                ".container-chapter-reader img",
            ]),
            chapter_list: SelectorList::new([
                ".list-chapter li a",
                "ul.row-content-chapter li a",
                ".chapter-list a",
                ".chapter_list a",
                ".chapters a",
            ]),
        }
    }
}

/// Ordered CSS selector fallbacks
///
/// Deserializes from either a string or an array of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "OneOrMany")]
pub struct SelectorList(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for SelectorList {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(selector) => Self(vec![selector]),
            OneOrMany::Many(selectors) => Self(selectors),
        }
    }
}

impl From<&str> for SelectorList {
    fn from(selector: &str) -> Self {
        Self(vec![selector.to_string()])
    }
}

impl SelectorList {
    pub fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(selectors.into_iter().map(Into::into).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path of the JSON collection
    pub path: String,

    /// Optional markdown run summary
    pub summary_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./stories.json".to_string(),
            summary_path: None,
        }
    }
}

/// Git publishing configuration
///
/// Publishing is enabled only when `name`, `email`, `token` and
/// `repository` are all present.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PublishConfig {
    pub name: Option<String>,
    pub email: Option<String>,
    pub token: Option<String>,

    /// Repository identifier, e.g. `owner/repo`
    pub repository: Option<String>,
    pub branch: String,
    pub host: String,

    /// Working copy the artifact is committed from
    pub workdir: String,
    pub commit_message: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            name: None,
            email: None,
            token: None,
            repository: None,
            branch: "main".to_string(),
            host: "github.com".to_string(),
            workdir: ".".to_string(),
            commit_message: "Update stories.json".to_string(),
        }
    }
}

impl PublishConfig {
    /// Names of the required settings that are missing or blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("token", &self.token),
            ("repository", &self.repository),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
        .map(|(field, _)| field)
        .collect()
    }

    /// Returns true if every required setting is present
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}
