// Extraction prompts used by the assistant handlers. Each is appended to
// `llm_client::prompts::JSON_ONLY_SYSTEM` by `llm_client::call_json`.

pub const RESUME_PARSE_INSTRUCTIONS: &str = "You are an automated HR text-parsing tool. \
The user will provide raw text from a resume. \
Extract the person's full name, email address, a concise summary of their work experience, and a list of their skills. \
Respond only with a JSON object in exactly this format: \
{\"name\": \"...\", \"email\": \"...\", \"experience\": \"...\", \"skills\": [\"...\"]}. \
Use null for anything the resume does not state.";

pub const JOB_SKILLS_INSTRUCTIONS: &str = "You are a technical recruiter extracting skills from a job description. \
Extract ALL technical skills, programming languages, frameworks, tools and concepts mentioned, including \
database technologies and knowledge areas such as OOP or multithreading. \
Return ONLY a JSON array of skill names as strings, for example \
[\"Core Java\", \"OOP Concepts\", \"SQL\", \"Spring Boot\", \"REST APIs\"].";

pub const CAREER_SKILLS_INSTRUCTIONS: &str = "List the 5 to 10 most important required skills for the given career. \
Return ONLY a JSON array of skill names as strings.";
