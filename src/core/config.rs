use std::env;

/// Instruction prompt sent as the system message on every request. The
/// `<end/>` marker it asks for is how the round controller knows the
/// model finished the full transcript rather than running out of tokens.
pub const SYSTEM_PROMPT: &str = "你是一个视频文稿助手，任务是将视频的字幕重新组织为原来的文稿。
请按以下要求对字幕进行处理：

1. **忠于原文**：请确保转换后的文本忠实于原文的意思，不要改变或添加原始内容。
2. **删除冗余的语气词**：删除所有不必要的语气词和填充词（例如：“嗯”、“啊”、“就”、“那个”、“像是说”、“so”、“that”、“其实”等），使文本更加简洁。
3. **处理广告部分**：如果字幕中包含广告内容，请删除。
4. **标点符号**：补充适当的标点符号（如句号、逗号、引号等），以确保语句的语法正确。
5. **分段**：重新分段，按传统文章的格式分段，每段应包含一个观点或事件，而非单个标点符号分段。相反地，多个事件请分多段，即使段落本身不长。一段不超过5句话。
6. **修正错误**：字幕文件可能包含语音识别错误（如错字、缺字等），你需要根据上下文修正这些错误。
7. **输出结束标记**：在转换后的文本末尾输出 `<end/>`，表示文稿输出完成。如果因单轮回答超过上限也不要自行压缩语句，而是通过多轮对话完成。

强调：请确保转换后的文本忠实于原文的意思，不要改变或添加原始内容。你的任务**不是**总结文稿，只是恢复没有排版的字幕。
只输出修正后的文本，不需要任何解释。";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub max_rounds: usize,
    pub system_prompt: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let openai_api_key =
            env::var("OPENAI_API_KEY").unwrap_or_else(|_| "thiswontworkforopenai".to_string());
        let openai_base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://dashscope.aliyuncs.com/compatible-mode/v1".to_string());
        let openai_model =
            env::var("OPENAI_MODEL").unwrap_or_else(|_| "qwen-turbo-latest".to_string());
        let temperature = env::var("MODEL_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.6);
        let max_tokens = env::var("MODEL_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8192);
        let max_rounds = env::var("MODEL_MAX_ROUNDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        Self {
            openai_api_key,
            openai_base_url,
            openai_model,
            temperature,
            max_tokens,
            max_rounds,
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }
}
