pub const RECIPE_NAME_MAX_LENGTH: usize = 100;

/// Category tags with their Croatian display names, in menu order.
pub const RECIPE_CATEGORIES: &[(&str, &str)] = &[
    ("GLAVNA_JELA", "Glavna jela"),
    ("DESERTI", "Deserti"),
    ("KRUH_I_PECIVA", "Kruh i peciva"),
    ("PREDJELA", "Predjela"),
    ("JUHE", "Juhe"),
    ("SALATE", "Salate"),
    ("PICA", "Pića"),
    ("SOKOVI_I_NAPICI", "Sokovi i napici"),
    ("PRILOZI", "Prilozi"),
    ("UMACI", "Umaci"),
];

pub const UNKNOWN_CATEGORY_LABEL: &str = "Nepoznata kategorija";

pub const DIFFICULTY_LEVELS: &[(&str, &str)] = &[
    ("EASY", "Jednostavno"),
    ("MEDIUM", "Srednje zahtjevno"),
    ("HARD", "Složeno"),
];

pub const DEFAULT_CDN_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_BASE_URL: &str = "https://localhost:3000";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_CDN_ROOT: &str = "public/cdn";

pub const CDN_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";
pub const CDN_CACHE_STATUS: &str = "HIT";
pub const CDN_PROVIDER: &str = "recepti-cdn";
pub const MAX_BODY_BYTES: u64 = 64 * 1024;
