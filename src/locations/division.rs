//! District -> division mapping and best-effort normalization of division
//! names found in scraped or geocoded text.

pub const CANONICAL_DIVISIONS: [&str; 8] = [
    "Barishal",
    "Chattogram",
    "Dhaka",
    "Khulna",
    "Mymensingh",
    "Rajshahi",
    "Rangpur",
    "Sylhet",
];

/// Authoritative district -> division table (canonical English spellings).
pub const DISTRICT_DIVISIONS: [(&str, &str); 64] = [
    // Barishal
    ("Barguna", "Barishal"),
    ("Barishal", "Barishal"),
    ("Bhola", "Barishal"),
    ("Jhalokathi", "Barishal"),
    ("Patuakhali", "Barishal"),
    ("Pirojpur", "Barishal"),
    // Chattogram
    ("Bandarban", "Chattogram"),
    ("Brahmanbaria", "Chattogram"),
    ("Chandpur", "Chattogram"),
    ("Chattogram", "Chattogram"),
    ("Cumilla", "Chattogram"),
    ("Cox's Bazar", "Chattogram"),
    ("Feni", "Chattogram"),
    ("Khagrachhari", "Chattogram"),
    ("Lakshmipur", "Chattogram"),
    ("Noakhali", "Chattogram"),
    ("Rangamati", "Chattogram"),
    // Dhaka
    ("Dhaka", "Dhaka"),
    ("Faridpur", "Dhaka"),
    ("Gazipur", "Dhaka"),
    ("Gopalganj", "Dhaka"),
    ("Kishoreganj", "Dhaka"),
    ("Madaripur", "Dhaka"),
    ("Manikganj", "Dhaka"),
    ("Munshiganj", "Dhaka"),
    ("Narayanganj", "Dhaka"),
    ("Narsingdi", "Dhaka"),
    ("Rajbari", "Dhaka"),
    ("Shariatpur", "Dhaka"),
    ("Tangail", "Dhaka"),
    // Khulna
    ("Bagerhat", "Khulna"),
    ("Chuadanga", "Khulna"),
    ("Jashore", "Khulna"),
    ("Jhenaidah", "Khulna"),
    ("Khulna", "Khulna"),
    ("Kushtia", "Khulna"),
    ("Magura", "Khulna"),
    ("Meherpur", "Khulna"),
    ("Narail", "Khulna"),
    ("Satkhira", "Khulna"),
    // Mymensingh
    ("Jamalpur", "Mymensingh"),
    ("Mymensingh", "Mymensingh"),
    ("Netrokona", "Mymensingh"),
    ("Sherpur", "Mymensingh"),
    // Rajshahi
    ("Bogura", "Rajshahi"),
    ("Chapai Nawabganj", "Rajshahi"),
    ("Joypurhat", "Rajshahi"),
    ("Naogaon", "Rajshahi"),
    ("Natore", "Rajshahi"),
    ("Pabna", "Rajshahi"),
    ("Rajshahi", "Rajshahi"),
    ("Sirajganj", "Rajshahi"),
    // Rangpur
    ("Dinajpur", "Rangpur"),
    ("Gaibandha", "Rangpur"),
    ("Kurigram", "Rangpur"),
    ("Lalmonirhat", "Rangpur"),
    ("Nilphamari", "Rangpur"),
    ("Panchagarh", "Rangpur"),
    ("Rangpur", "Rangpur"),
    ("Thakurgaon", "Rangpur"),
    // Sylhet
    ("Habiganj", "Sylhet"),
    ("Moulvibazar", "Sylhet"),
    ("Sunamganj", "Sylhet"),
    ("Sylhet", "Sylhet"),
];

/// Suffixes stripped from free-text division names (English and Bangla).
const DIVISION_SUFFIXES: [&str; 2] = [" Division", " বিভাগ"];

/// Lowercased spellings, legacy names and Bangla names -> canonical division.
const DIVISION_VARIANTS: [(&str, &str); 18] = [
    ("barisal", "Barishal"),
    ("barishal", "Barishal"),
    ("chittagong", "Chattogram"),
    ("chattogram", "Chattogram"),
    ("dhaka", "Dhaka"),
    ("khulna", "Khulna"),
    ("mymensingh", "Mymensingh"),
    ("rajshahi", "Rajshahi"),
    ("rangpur", "Rangpur"),
    ("sylhet", "Sylhet"),
    ("বরিশাল", "Barishal"),
    ("চট্টগ্রাম", "Chattogram"),
    ("ঢাকা", "Dhaka"),
    ("খুলনা", "Khulna"),
    ("ময়মনসিংহ", "Mymensingh"),
    ("রাজশাহী", "Rajshahi"),
    ("রংপুর", "Rangpur"),
    ("সিলেট", "Sylhet"),
];

pub fn division_for_district(district: &str) -> Option<&'static str> {
    let name = district.trim();
    DISTRICT_DIVISIONS
        .iter()
        .find(|(d, _)| *d == name)
        .map(|(_, division)| *division)
}

/// Canonical division for `district`.
///
/// Known districts always resolve through the authoritative table and
/// `raw_division` is ignored. Anything else falls back to cleaning up
/// `raw_division`: suffix removal, case-insensitive aliasing, then title case.
pub fn normalize_division(district: &str, raw_division: &str) -> String {
    if let Some(division) = division_for_district(district) {
        return division.to_string();
    }

    let mut value = raw_division.trim();
    if value.is_empty() {
        return String::new();
    }
    for suffix in DIVISION_SUFFIXES {
        if let Some(stripped) = value.strip_suffix(suffix) {
            value = stripped;
        }
    }

    let lowered = value.to_lowercase();
    DIVISION_VARIANTS
        .iter()
        .find(|(variant, _)| *variant == lowered)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| title_case(value))
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for c in value.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
