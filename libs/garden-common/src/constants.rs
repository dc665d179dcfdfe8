//! Constants shared by the garden engine and CLI

use std::ops::RangeInclusive;

/// Milliseconds in one day
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Seed lots at or below this quantity are reported as low stock
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 2;

/// Seed lots expiring within this many days are reported as expiring soon
pub const DEFAULT_EXPIRY_WINDOW_DAYS: i64 = 90;

/// Harvest-soon window used by the dashboard view
pub const DASHBOARD_HARVEST_WINDOW_DAYS: i64 = 7;

/// Harvest-soon window used by the command-center view
pub const COMMAND_CENTER_HARVEST_WINDOW_DAYS: i64 = 14;

/// Months (1-based) in which the last spring frost date is surfaced
pub const SPRING_FROST_MONTHS: RangeInclusive<u32> = 3..=5;

/// Months (1-based) in which the first fall frost date is surfaced
pub const FALL_FROST_MONTHS: RangeInclusive<u32> = 9..=11;

/// Largest accepted UTC offset, in minutes
pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Day-group heading format ("January 6, 2024")
pub const DAY_GROUP_FORMAT: &str = "%B %-d, %Y";

/// Short display format for dates inside alert and event text ("Apr 15")
pub const SHORT_DATE_FORMAT: &str = "%b %-d";

/// Supported date formats
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Supported naive datetime formats (interpreted as UTC)
pub const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Snapshot file names read from a snapshot directory
pub const PLANTINGS_FILE: &str = "plantings.json";
pub const TASKS_FILE: &str = "tasks.json";
pub const SEEDS_FILE: &str = "seeds.json";
pub const PHOTOS_FILE: &str = "photos.json";
pub const PROFILE_FILE: &str = "profile.json";
