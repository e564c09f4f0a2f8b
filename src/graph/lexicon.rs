//! Pattern tables driving entity and relation extraction.
//!
//! The built-in tables target Chinese prose. A TOML file can replace any of
//! them; fields it leaves out keep their built-in value.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{EntityType, RelationType};
use crate::error::{NotegraphError, Result};

/// CJK unified ideographs, the basic block.
const HAN: &str = r"[\x{4e00}-\x{9fa5}]";

/// One entity matcher. When the pattern has a `name` capture group, only that
/// group is the surface string; otherwise the whole match is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSpec {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub pattern: String,
}

/// Trigger substrings for one relation type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSpec {
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    pub keywords: Vec<String>,
}

/// Immutable extraction tables, handed to the extractors at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexicon {
    /// Scanned in order; order decides first-seen entity order.
    #[serde(default = "default_entity_patterns")]
    pub entity_patterns: Vec<PatternSpec>,
    /// Known place names, matched as plain substrings.
    #[serde(default = "default_gazetteer")]
    pub gazetteer: Vec<String>,
    /// Checked in order; the first type with a hit wins.
    #[serde(default = "default_relation_keywords")]
    pub relation_keywords: Vec<KeywordSpec>,
    /// Characters ending a sentence.
    #[serde(default = "default_sentence_delimiters")]
    pub sentence_delimiters: String,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            entity_patterns: default_entity_patterns(),
            gazetteer: default_gazetteer(),
            relation_keywords: default_relation_keywords(),
            sentence_delimiters: default_sentence_delimiters(),
        }
    }
}

impl Lexicon {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source)
            .map_err(|e| NotegraphError::Config(format!("Failed to parse lexicon: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        let lexicon = Self::from_toml_str(&source)?;
        log::debug!(
            "Loaded lexicon from {}: {} patterns, {} places, {} keyword lists",
            path.display(),
            lexicon.entity_patterns.len(),
            lexicon.gazetteer.len(),
            lexicon.relation_keywords.len()
        );
        Ok(lexicon)
    }
}

fn pattern(entity_type: EntityType, pattern: String) -> PatternSpec {
    PatternSpec {
        entity_type,
        pattern,
    }
}

/// `<name>` of `min..=max` ideographs followed by a trigger word.
fn before(min: u32, max: u32, triggers: &str) -> String {
    format!("(?P<name>{HAN}{{{min},{max}}})(?:{triggers})")
}

/// Trigger word followed by a `<name>` of `min..=max` ideographs.
fn after(triggers: &str, min: u32, max: u32) -> String {
    format!("(?:{triggers})(?P<name>{HAN}{{{min},{max}}})")
}

/// Run of ideographs ending in one of `suffixes`, suffix included.
fn suffixed(suffixes: &str) -> String {
    format!("{HAN}+(?:{suffixes})")
}

fn default_entity_patterns() -> Vec<PatternSpec> {
    const SPEECH: &str = "说|道|认为|表示|指出|强调|提到|发现|发明|创造|建立|创建";
    const TITLES: &str = "作者|学者|教授|博士|先生|女士|老师|专家";
    const ORG_SUFFIXES: &str =
        "公司|集团|企业|机构|大学|学院|研究所|研究院|医院|政府|部门|组织|协会|学会|银行|基金";
    const PLACE_SUFFIXES: &str = "省|市|县|区|镇|村|岛|山|河|湖|海|洋|洲|国|地区";
    const MOTION: &str =
        "位于|在|来自|前往|到达|去|到|离开|回到|出生于|居住于|生活在";
    const VICINITY: &str = "地区|一带|附近|周边|境内";
    const EVENT_SUFFIXES: &str =
        "会议|大会|活动|比赛|战争|革命|运动|事件|事故|灾难|发明|发现";
    const CONCEPT_WORDS: &str = "理论|概念|原理|方法|技术|模式|系统|框架|模型";

    vec![
        pattern(EntityType::Person, before(2, 4, SPEECH)),
        pattern(EntityType::Person, after(TITLES, 2, 4)),
        pattern(EntityType::Organization, suffixed(ORG_SUFFIXES)),
        pattern(EntityType::Location, suffixed(PLACE_SUFFIXES)),
        pattern(EntityType::Location, after(MOTION, 2, 10)),
        pattern(EntityType::Location, before(2, 10, VICINITY)),
        pattern(EntityType::Date, "[0-9]{4}年[0-9]{1,2}月[0-9]{1,2}日".to_string()),
        pattern(EntityType::Date, "[0-9]{4}年[0-9]{1,2}月".to_string()),
        pattern(EntityType::Date, "[0-9]{1,2}月[0-9]{1,2}日".to_string()),
        pattern(EntityType::Event, suffixed(EVENT_SUFFIXES)),
        pattern(EntityType::Concept, before(2, 8, CONCEPT_WORDS)),
        pattern(EntityType::Concept, after(CONCEPT_WORDS, 2, 8)),
    ]
}

fn default_gazetteer() -> Vec<String> {
    const PLACES: &[&str] = &[
        // cities
        "北京", "上海", "广州", "深圳", "杭州", "南京", "苏州", "成都", "重庆", "武汉",
        "西安", "天津", "青岛", "大连", "厦门", "宁波", "无锡", "长沙", "郑州", "济南",
        "福州", "哈尔滨", "沈阳", "长春", "昆明", "贵阳", "南宁", "海口", "兰州", "银川",
        "西宁", "乌鲁木齐", "拉萨", "呼和浩特", "石家庄", "太原", "合肥", "南昌", "台北",
        "香港", "澳门", "东莞", "佛山", "珠海", "温州", "绍兴", "常州", "徐州", "扬州",
        "烟台", "洛阳", "开封", "大同", "喀什", "吐鲁番", "延安", "遵义", "景德镇", "泉州",
        "东京", "大阪", "京都", "首尔", "伦敦", "巴黎", "柏林", "罗马", "莫斯科", "纽约",
        "华盛顿", "洛杉矶", "旧金山", "芝加哥", "波士顿", "多伦多", "温哥华", "悉尼",
        "墨尔本", "曼谷", "河内", "吉隆坡", "雅加达", "孟买", "新德里", "迪拜", "开罗",
        // countries and regions
        "中国", "美国", "日本", "韩国", "英国", "法国", "德国", "意大利", "俄罗斯", "加拿大",
        "澳大利亚", "巴西", "印度", "新加坡", "泰国", "越南", "马来西亚", "印度尼西亚",
        "菲律宾", "西班牙", "葡萄牙", "荷兰", "瑞士", "瑞典", "挪威", "芬兰", "丹麦",
        "波兰", "埃及", "南非", "墨西哥", "阿根廷", "新西兰", "蒙古", "朝鲜", "欧洲",
        "亚洲", "非洲", "北美洲", "南美洲", "大洋洲", "南极洲",
        // landmarks
        "长城", "故宫", "天坛", "颐和园", "圆明园", "兵马俑", "敦煌", "泰山", "华山", "黄山",
        "峨眉山", "九寨沟", "张家界", "桂林", "丽江", "三亚", "西湖", "太湖", "洞庭湖",
        "鄱阳湖", "布达拉宫", "莫高窟", "乐山大佛", "武夷山", "庐山", "五台山", "珠穆朗玛峰",
        "喜马拉雅山", "青藏高原", "塔克拉玛干", "香格里拉", "鼓浪屿", "外滩", "秦淮河",
        // rivers
        "长江", "黄河", "珠江", "松花江", "淮河", "汉江", "湘江", "赣江", "闽江", "钱塘江",
        "澜沧江", "雅鲁藏布江", "黑龙江", "嘉陵江",
    ];
    PLACES.iter().map(|p| p.to_string()).collect()
}

fn default_relation_keywords() -> Vec<KeywordSpec> {
    let table: [(RelationType, &[&str]); 9] = [
        (RelationType::PartOf, &["属于", "包含", "组成", "部分", "成员"]),
        (RelationType::HasProperty, &["具有", "拥有", "特点是", "特征是", "属性"]),
        (RelationType::Causes, &["导致", "引起", "造成", "产生", "引发"]),
        (RelationType::Created, &["创建", "建立", "发明", "发现", "提出"]),
        (RelationType::Located, &["位于", "在", "存在于", "地点"]),
        (RelationType::Participated, &["参与", "参加", "出席", "加入"]),
        (RelationType::Similar, &["相似", "类似", "相同", "一样", "同等"]),
        (RelationType::Opposite, &["相反", "对立", "矛盾", "不同"]),
        (RelationType::Related, &["相关", "关联", "联系", "关系"]),
    ];
    table
        .into_iter()
        .map(|(relation_type, keywords)| KeywordSpec {
            relation_type,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        })
        .collect()
}

fn default_sentence_delimiters() -> String {
    "。！？；\n".to_string()
}
