use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub words_file: String,
    pub words_per_duel: usize,
    pub seconds_per_word: i64,
    pub catalog_ttl_seconds: u64,
    pub room_retention_minutes: i64,
    pub cleanup_interval_seconds: u64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            words_file: env::var("WORDS_FILE").unwrap_or_else(|_| "./shared/words.json".to_string()),
            words_per_duel: env::var("WORDS_PER_DUEL")
                .unwrap_or_else(|_| duel_core::consts::WORDS_PER_DUEL.to_string())
                .parse()
                .expect("Invalid WORDS_PER_DUEL"),
            seconds_per_word: env::var("SECONDS_PER_WORD")
                .unwrap_or_else(|_| duel_core::consts::SECONDS_PER_WORD.to_string())
                .parse()
                .expect("Invalid SECONDS_PER_WORD"),
            catalog_ttl_seconds: env::var("CATALOG_TTL_SECONDS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .expect("Invalid CATALOG_TTL_SECONDS"),
            room_retention_minutes: env::var("ROOM_RETENTION_MINUTES")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .expect("Invalid ROOM_RETENTION_MINUTES"),
            cleanup_interval_seconds: env::var("CLEANUP_INTERVAL_SECONDS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .expect("Invalid CLEANUP_INTERVAL_SECONDS"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
