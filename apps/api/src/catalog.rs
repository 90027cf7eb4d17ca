//! Ideathon categories and the icon shown for each.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    Shirt,
    Recycle,
    MapPin,
    Lightbulb,
    #[serde(rename = "trash-2")]
    Trash2,
    RefreshCw,
    /// Fallback for categories outside the catalog.
    HelpCircle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    SustainableFashion,
    WasteToWealth,
    SustainableTourism,
    SustainableEnergy,
    CombatingPlasticPollution,
    CircularBusinessModels,
    Other(String),
}

impl Category {
    pub const KNOWN: [Category; 6] = [
        Category::SustainableFashion,
        Category::WasteToWealth,
        Category::SustainableTourism,
        Category::SustainableEnergy,
        Category::CombatingPlasticPollution,
        Category::CircularBusinessModels,
    ];

    /// Matches catalog names case-insensitively; anything else is `Other`.
    pub fn from_name(name: &str) -> Self {
        let trimmed = name.trim();
        Self::KNOWN
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| Category::Other(trimmed.to_string()))
    }

    pub fn name(&self) -> &str {
        match self {
            Category::SustainableFashion => "Sustainable Fashion",
            Category::WasteToWealth => "Waste to Wealth",
            Category::SustainableTourism => "Sustainable Tourism",
            Category::SustainableEnergy => "Sustainable Energy",
            Category::CombatingPlasticPollution => "Combating Plastic Pollution",
            Category::CircularBusinessModels => "Circular Business Models",
            Category::Other(name) => name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Category::SustainableFashion => {
                "Innovations in eco-friendly clothing, materials, and production processes."
            }
            Category::WasteToWealth => {
                "Transforming waste materials into valuable resources and products."
            }
            Category::SustainableTourism => "Promoting eco-conscious travel and tourism practices.",
            Category::SustainableEnergy => {
                "Developing and implementing renewable and efficient energy solutions."
            }
            Category::CombatingPlasticPollution => {
                "Innovative solutions to reduce, reuse, and recycle plastics."
            }
            Category::CircularBusinessModels => {
                "Creating regenerative systems where resources are kept in use for as long as possible."
            }
            Category::Other(_) => "",
        }
    }

    pub fn icon(&self) -> Icon {
        match self {
            Category::SustainableFashion => Icon::Shirt,
            Category::WasteToWealth => Icon::Recycle,
            Category::SustainableTourism => Icon::MapPin,
            Category::SustainableEnergy => Icon::Lightbulb,
            Category::CombatingPlasticPollution => Icon::Trash2,
            Category::CircularBusinessModels => Icon::RefreshCw,
            Category::Other(_) => Icon::HelpCircle,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryInfo {
    pub name: String,
    pub description: String,
    pub icon: Icon,
}

impl From<&Category> for CategoryInfo {
    fn from(category: &Category) -> Self {
        CategoryInfo {
            name: category.name().to_string(),
            description: category.description().to_string(),
            icon: category.icon(),
        }
    }
}

/// GET /api/categories
pub async fn handle_list_categories() -> axum::Json<Vec<CategoryInfo>> {
    axum::Json(Category::KNOWN.iter().map(CategoryInfo::from).collect())
}
