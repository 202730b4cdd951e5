//! Deterministic local name generator.
//!
//! Used for any slot the completion API could not fill. Output depends only
//! on the slot index, the drawn surname, the gender and the names already
//! produced in the call, so it works with the API fully down.

use namecraft_core::{CharacterBreakdown, Gender, NameData};

/// A family name with its reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surname {
    /// The character.
    pub character: &'static str,
    /// Pinyin with tone marks.
    pub pinyin: &'static str,
    /// Literal meaning.
    pub meaning: &'static str,
}

const fn surname(character: &'static str, pinyin: &'static str, meaning: &'static str) -> Surname {
    Surname {
        character,
        pinyin,
        meaning,
    }
}

/// The 30 family names slots draw from.
pub static SURNAMES: [Surname; 30] = [
    surname("王", "Wáng", "king"),
    surname("李", "Lǐ", "plum tree"),
    surname("张", "Zhāng", "to open, to extend"),
    surname("刘", "Liú", "to kill, an ancient axe"),
    surname("陈", "Chén", "to display, old"),
    surname("杨", "Yáng", "poplar"),
    surname("黄", "Huáng", "yellow"),
    surname("赵", "Zhào", "to return, an ancient state"),
    surname("吴", "Wú", "an ancient state of the south"),
    surname("周", "Zhōu", "complete, circumference"),
    surname("徐", "Xú", "slowly, calmly"),
    surname("孙", "Sūn", "grandchild"),
    surname("马", "Mǎ", "horse"),
    surname("朱", "Zhū", "vermilion"),
    surname("胡", "Hú", "beard, an ancient state"),
    surname("郭", "Guō", "outer city wall"),
    surname("何", "Hé", "what, to carry"),
    surname("高", "Gāo", "tall, high"),
    surname("林", "Lín", "forest"),
    surname("罗", "Luó", "net for catching birds"),
    surname("郑", "Zhèng", "solemn, serious"),
    surname("梁", "Liáng", "bridge, roof beam"),
    surname("谢", "Xiè", "to thank"),
    surname("宋", "Sòng", "the Song dynasty"),
    surname("唐", "Táng", "the Tang dynasty"),
    surname("许", "Xǔ", "to promise, to allow"),
    surname("韩", "Hán", "an ancient state"),
    surname("冯", "Féng", "to gallop"),
    surname("邓", "Dèng", "an ancient state"),
    surname("曹", "Cáo", "an official, a companion"),
];

struct Glyph {
    character: &'static str,
    pinyin: &'static str,
    meaning: &'static str,
    explanation: &'static str,
}

const fn glyph(
    character: &'static str,
    pinyin: &'static str,
    meaning: &'static str,
    explanation: &'static str,
) -> Glyph {
    Glyph {
        character,
        pinyin,
        meaning,
        explanation,
    }
}

static GIVEN_GLYPHS: [Glyph; 31] = [
    glyph("浩", "hào", "vast", "Evokes boundless water and a generous spirit."),
    glyph("然", "rán", "natural", "Suggests ease and being true to oneself."),
    glyph("子", "zǐ", "scholar", "A classical honorific for a learned person."),
    glyph("轩", "xuān", "lofty", "Originally a high carriage, implying dignity."),
    glyph("宇", "yǔ", "universe", "Speaks of breadth of vision."),
    glyph("航", "háng", "to sail", "Carries the sense of steady progress."),
    glyph("明", "míng", "bright", "Sun and moon together, meaning clarity and wisdom."),
    glyph("哲", "zhé", "wise", "Used for philosophers and thoughtful people."),
    glyph("俊", "jùn", "talented", "Praises both ability and good looks."),
    glyph("杰", "jié", "outstanding", "Marks someone who rises above others."),
    glyph("志", "zhì", "aspiration", "The will to pursue great goals."),
    glyph("远", "yuǎn", "far-reaching", "Long horizons and lasting ambition."),
    glyph("雨", "yǔ", "rain", "Nourishing rain that brings growth."),
    glyph("桐", "tóng", "paulownia", "The tree where the phoenix is said to rest."),
    glyph("思", "sī", "thoughtful", "Reflection and a caring mind."),
    glyph("琪", "qí", "fine jade", "A precious, finely worked stone."),
    glyph("欣", "xīn", "joyful", "Warm happiness that others share."),
    glyph("怡", "yí", "harmonious", "Calm contentment and pleasant manner."),
    glyph("诗", "shī", "poetry", "Refinement and a love of the arts."),
    glyph("涵", "hán", "inclusive", "Depth of character and tolerance."),
    glyph("婉", "wǎn", "gentle", "Grace and tactful kindness."),
    glyph("清", "qīng", "clear", "Purity like clear water."),
    glyph("梦", "mèng", "dream", "Imagination and hope."),
    glyph("瑶", "yáo", "precious jade", "Beauty that is rare and treasured."),
    glyph("一", "yī", "one", "Wholeness and singular focus."),
    glyph("诺", "nuò", "promise", "Someone whose word can be trusted."),
    glyph("若", "ruò", "like", "Gentle modesty, as in classical verse."),
    glyph("溪", "xī", "stream", "A mountain brook, lively and pure."),
    glyph("安", "ān", "peace", "A calm home and a settled heart."),
    glyph("和", "hé", "harmony", "Balance with others and with nature."),
    glyph("墨", "mò", "ink", "Scholarship and the art of calligraphy."),
];

static MALE_PAIRS: [[&str; 2]; 6] = [
    ["浩", "然"],
    ["子", "轩"],
    ["宇", "航"],
    ["明", "哲"],
    ["俊", "杰"],
    ["志", "远"],
];

static FEMALE_PAIRS: [[&str; 2]; 6] = [
    ["雨", "桐"],
    ["思", "琪"],
    ["欣", "怡"],
    ["诗", "涵"],
    ["婉", "清"],
    ["梦", "瑶"],
];

static NEUTRAL_PAIRS: [[&str; 2]; 6] = [
    ["一", "诺"],
    ["若", "溪"],
    ["安", "然"],
    ["明", "远"],
    ["清", "和"],
    ["子", "墨"],
];

fn pairs_for(gender: Gender) -> &'static [[&'static str; 2]] {
    match gender {
        Gender::Male => &MALE_PAIRS,
        Gender::Female => &FEMALE_PAIRS,
        Gender::Neutral => &NEUTRAL_PAIRS,
    }
}

fn lookup(character: &str) -> Option<&'static Glyph> {
    GIVEN_GLYPHS.iter().find(|g| g.character == character)
}

fn capitalize(syllable: &str) -> String {
    let mut chars = syllable.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn build(surname: &Surname, pair: [&str; 2], gender: Gender) -> NameData {
    let glyphs: Vec<&Glyph> = pair.iter().filter_map(|c| lookup(c)).collect();

    let given_pinyin: String = glyphs.iter().map(|g| g.pinyin).collect();
    let mut characters = vec![CharacterBreakdown {
        character: surname.character.to_string(),
        pinyin: surname.pinyin.to_lowercase(),
        meaning: surname.meaning.to_string(),
        explanation: format!("The family name {}.", surname.pinyin),
    }];
    characters.extend(glyphs.iter().map(|g| CharacterBreakdown {
        character: g.character.to_string(),
        pinyin: g.pinyin.to_string(),
        meaning: g.meaning.to_string(),
        explanation: g.explanation.to_string(),
    }));

    let meanings: Vec<&str> = glyphs.iter().map(|g| g.meaning).collect();

    NameData {
        chinese: format!("{}{}", surname.character, pair.concat()),
        pinyin: format!("{} {}", surname.pinyin, capitalize(&given_pinyin)),
        characters,
        meaning: format!("A name combining \"{}\".", meanings.join("\" and \"")),
        cultural_notes: format!(
            "{} is among the most common Chinese family names; the given name uses characters long favored in {} names.",
            surname.character,
            match gender {
                Gender::Male => "boys'",
                Gender::Female => "girls'",
                Gender::Neutral => "unisex",
            }
        ),
        personality_match: "Chosen for balance and positive meaning.".to_string(),
        style: "classic".to_string(),
    }
}

/// Produce a valid name for slot `index` that is not in `seen`.
///
/// Starts from the pair at `index` with the drawn surname and probes forward
/// through the pairs, then the surnames, until a fresh name is found.
#[must_use]
pub fn fallback_name(index: usize, surname: &Surname, gender: Gender, seen: &[String]) -> NameData {
    let pairs = pairs_for(gender);
    let start = SURNAMES
        .iter()
        .position(|s| s.character == surname.character)
        .unwrap_or(0);

    for surname_offset in 0..SURNAMES.len() {
        let candidate_surname = if surname_offset == 0 {
            surname
        } else {
            &SURNAMES[(start + surname_offset) % SURNAMES.len()]
        };

        for pair_offset in 0..pairs.len() {
            let pair = pairs[(index + pair_offset) % pairs.len()];
            let chinese = format!("{}{}", candidate_surname.character, pair.concat());
            if !seen.contains(&chinese) {
                return build(candidate_surname, pair, gender);
            }
        }
    }

    build(surname, pairs[index % pairs.len()], gender)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pair_character_has_a_glyph() {
        for pair in MALE_PAIRS.iter().chain(&FEMALE_PAIRS).chain(&NEUTRAL_PAIRS) {
            for character in pair {
                assert!(lookup(character).is_some(), "missing glyph for {character}");
            }
        }
    }

    #[test]
    fn surnames_are_unique() {
        for (i, a) in SURNAMES.iter().enumerate() {
            assert!(SURNAMES[i + 1..].iter().all(|b| b.character != a.character));
        }
    }

    #[test]
    fn fallback_is_deterministic_and_complete() {
        let first = fallback_name(2, &SURNAMES[0], Gender::Female, &[]);
        let second = fallback_name(2, &SURNAMES[0], Gender::Female, &[]);

        assert_eq!(first.chinese, second.chinese);
        assert_eq!(first.chinese, "王欣怡");
        assert_eq!(first.pinyin, "Wáng Xīnyí");
        assert_eq!(first.characters.len(), 3);
        assert!(first.is_complete());
    }

    #[test]
    fn fallback_probes_past_seen_names() {
        let seen = vec!["李浩然".to_string(), "李子轩".to_string()];
        let name = fallback_name(0, &SURNAMES[1], Gender::Male, &seen);
        assert_eq!(name.chinese, "李宇航");
    }

    #[test]
    fn fallback_switches_surname_when_pairs_run_out() {
        let seen: Vec<String> = NEUTRAL_PAIRS
            .iter()
            .map(|pair| format!("张{}", pair.concat()))
            .collect();
        let name = fallback_name(0, &SURNAMES[2], Gender::Neutral, &seen);
        assert!(!seen.contains(&name.chinese));
        assert!(name.chinese.starts_with('刘'));
    }

    #[test]
    fn six_fallbacks_in_a_row_never_repeat() {
        let mut seen = Vec::new();
        for index in 0..6 {
            let name = fallback_name(index, &SURNAMES[5], Gender::Male, &seen);
            assert!(!seen.contains(&name.chinese));
            seen.push(name.chinese);
        }
        assert_eq!(seen.len(), 6);
    }
}
