use std::fmt;

/// Represents a Gemini model identifier.
///
/// This can be a predefined model version or a custom string value
/// for models that may be added in the future.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    /// Known model versions.
    Known(KnownModel),

    /// Custom model identifier (for future models or private endpoints).
    Custom(String),
}

/// Known Gemini model versions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum KnownModel {
    /// Gemini 2.5 Pro.
    Gemini25Pro,

    /// Gemini 2.5 Flash.
    Gemini25Flash,

    /// Gemini 2.5 Flash-Lite.
    Gemini25FlashLite,

    /// Gemini 2.0 Flash.
    Gemini20Flash,

    /// Gemini 2.0 Flash-Lite.
    Gemini20FlashLite,

    /// Gemini 1.5 Pro.
    Gemini15Pro,

    /// Gemini 1.5 Flash.
    Gemini15Flash,

    /// Gemini 1.5 Flash 8B.
    Gemini15Flash8B,
}

impl Model {
    /// Returns the model identifier as it appears in request paths.
    pub fn as_api_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Known(known_model) => write!(f, "{}", known_model),
            Model::Custom(custom) => write!(f, "{}", custom),
        }
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnownModel::Gemini25Pro => write!(f, "gemini-2.5-pro"),
            KnownModel::Gemini25Flash => write!(f, "gemini-2.5-flash"),
            KnownModel::Gemini25FlashLite => write!(f, "gemini-2.5-flash-lite"),
            KnownModel::Gemini20Flash => write!(f, "gemini-2.0-flash"),
            KnownModel::Gemini20FlashLite => write!(f, "gemini-2.0-flash-lite"),
            KnownModel::Gemini15Pro => write!(f, "gemini-1.5-pro"),
            KnownModel::Gemini15Flash => write!(f, "gemini-1.5-flash"),
            KnownModel::Gemini15Flash8B => write!(f, "gemini-1.5-flash-8b"),
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::Known(KnownModel::Gemini25Flash)
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        model.parse().unwrap_or(Model::Custom(model))
    }
}

impl std::str::FromStr for KnownModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gemini-2.5-pro" => Ok(KnownModel::Gemini25Pro),
            "gemini-2.5-flash" => Ok(KnownModel::Gemini25Flash),
            "gemini-2.5-flash-lite" => Ok(KnownModel::Gemini25FlashLite),
            "gemini-2.0-flash" => Ok(KnownModel::Gemini20Flash),
            "gemini-2.0-flash-lite" => Ok(KnownModel::Gemini20FlashLite),
            "gemini-1.5-pro" => Ok(KnownModel::Gemini15Pro),
            "gemini-1.5-flash" => Ok(KnownModel::Gemini15Flash),
            "gemini-1.5-flash-8b" => Ok(KnownModel::Gemini15Flash8B),
            _ => Err(format!("unknown model: {}", s)),
        }
    }
}

impl std::str::FromStr for Model {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<KnownModel>().map(Model::Known)
    }
}
