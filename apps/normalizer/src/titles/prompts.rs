//! Prompt construction for the clustering oracle.

/// Clustering instruction sent with every bucket. The oracle must answer
/// with a bare JSON object mapping each chosen canonical title to the list
/// of input variants assigned to it.
const CLUSTER_INSTRUCTION: &str = "Вы — эксперт в HR и нормализации названий должностей. \
    Я предоставлю список названий вакансий, некоторые из которых могут быть синонимами \
    или вариациями одной роли. Ваша задача — сгруппировать их в кластеры синонимов и \
    выбрать одно основное название для каждой группы (по возможности на английском). \
    Верните результат ТОЛЬКО в виде валидного JSON-объекта без пояснений, без markdown, \
    без обертки. Ключ — основное название, значение — список всех вариантов. \
    Пример: {\"Frontend Developer\": [\"Frontend Developer\", \"Frontend-разработчик\", \"Front-end Developer\"]}. \
    Вот список: ";

/// Builds the full clustering prompt for one bucket of titles.
pub fn cluster_prompt(titles: &[String]) -> String {
    let list = serde_json::to_string(titles).unwrap_or_else(|_| "[]".to_string());
    format!("{CLUSTER_INSTRUCTION}{list}")
}
