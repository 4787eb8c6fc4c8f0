//! The fixed tag vocabulary for listed plates.
//!
//! These lists drive the category filters and the admin item form. They are
//! compiled in rather than stored: the vocabulary changes with the
//! merchandising strategy, not with the data.

/// Plate types, in the order the filters present them.
pub const ITEM_TYPES: [&str; 12] = [
    "Dinner Plate",
    "Salad Plate",
    "Dessert Plate",
    "Soup Bowl",
    "Pasta Bowl",
    "Charger Plate",
    "Serving Platter",
    "Saucer",
    "Teacup & Saucer Set",
    "Appetizer Plate",
    "Decorative Plate",
    "Complete Set",
];

/// Manufacturing origins, most collectible first.
pub const ITEM_ORIGINS: [&str; 11] = [
    "French (Limoges)",
    "English (Staffordshire)",
    "Italian (Majolica)",
    "Chinese (Export)",
    "Japanese (Imari/Kutani)",
    "American",
    "German (Meissen)",
    "Dutch (Delft)",
    "Scandinavian",
    "Unknown",
    "Other",
];

/// Era buckets (start-of-period years).
pub const ITEM_ERAS: [i32; 15] = [
    1700, 1750, 1800, 1850, 1900, 1910, 1920, 1930, 1940, 1950, 1960, 1970, 1980, 1990, 2000,
];

/// Materials, porcelain family first.
pub const ITEM_MATERIALS: [&str; 14] = [
    "Porcelain",
    "Bone China",
    "Stoneware",
    "Earthenware",
    "Ironstone",
    "Creamware",
    "Faience",
    "Terracotta",
    "Glass",
    "Ceramic",
    "Majolica",
    "Pewter",
    "Silver Plated",
    "Unknown",
];

/// Tag value used when a new listing leaves a field blank.
pub const UNKNOWN_TAG: &str = "Unknown";

/// Image shown for listings without a photo.
pub const FALLBACK_IMAGE: &str = "/images/placeholder.png";

/// Whether `tag` is one of the known plate types.
#[must_use]
pub fn is_known_type(tag: &str) -> bool {
    ITEM_TYPES.contains(&tag)
}

/// Whether `tag` is one of the known origins.
#[must_use]
pub fn is_known_origin(tag: &str) -> bool {
    ITEM_ORIGINS.contains(&tag)
}

/// Whether `tag` is one of the known materials.
#[must_use]
pub fn is_known_material(tag: &str) -> bool {
    ITEM_MATERIALS.contains(&tag)
}
