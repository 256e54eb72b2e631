//! Embedded fallback prompts
//!
//! These are compiled into the binary and used when template files are not
//! found. Each template is rendered with Handlebars before being sent.

/// Transcription prompt; the audio blob travels as an inline media part
pub const TRANSCRIBE: &str = r#"Transcribe the attached audio recording to text.

Transcribe exactly what is spoken. Do not summarize, translate, or add
commentary. If the recording is silent or contains no speech, return an
empty transcription.

Your output must be a single JSON object with one field, "transcription".
"#;

/// Intent classification prompt
pub const ROUTE_INTENT: &str = r#"Analyze the following text and determine the user's primary intent. The user wants to create either a plan (like a to-do list or project plan) or a travel itinerary.

- If the text clearly describes tasks, to-do lists, goals, schedules, or explicitly asks to create a plan, the intent is 'createPlan'.
- If the text describes a trip, vacation, travel dates, destinations, or explicitly asks for an itinerary, the intent is 'createItinerary'.
{{#if context}}
- The user is currently viewing a {{context}}, so it is likely (but not certain) that they want to create or update a {{context}}. Do not let this override text that clearly asks for something else.
{{/if}}
- For anything else that doesn't fit (simple questions, greetings, unrelated statements), the intent is 'unsupported'.

Transcribed Text:
{{{transcribed_text}}}
"#;

/// Plan creation prompt: structure only, details are filled in per task
pub const PLAN_CREATE: &str = r#"You are a personal planning assistant. Create a structured plan from the user's transcribed voice input.

Structure the output as follows:
1. Give the plan a concise, relevant 'title' and a one-sentence 'summary'.
2. Group tasks into logical 'categories' (e.g. "Work", "Personal").
3. For each task, provide only a clear 'task' description. Do NOT include emoji, priority, or deadline fields; they are derived in a later step.
4. If the text mentions smaller steps for a task, list them as 'subtasks' with a 'completed' value of false.

Scenarios to handle:
- Simple to-do list ("I need to buy milk, eggs, and bread"): one task per item.
- Constrained scheduling ("Schedule my workout and a team meeting between 2 pm and 5 pm"): keep the constraint in each task description so the timing survives into the detail step.
- Proactive scheduling ("I need to go to the gym, do work, and study, make a plan for me"): propose a logical order and carry the suggested timing in each task description.

{{#if template}}
Use this template to guide the structure of the plan:
{{{template}}}
{{/if}}

Your final output must be a single, complete JSON object that strictly follows the output schema.

User's Transcribed Text:
{{{transcribed_text}}}
"#;

/// Plan update prompt: merge new text into an existing plan
pub const PLAN_UPDATE: &str = r#"You are a personal planning assistant. Update an existing structured plan based on new transcribed voice input.

You are given the existing plan as JSON and the user's new request. Intelligently merge the changes: this can mean adding, editing, or removing tasks and subtasks, or regrouping categories. Do not simply append new tasks.

Identifier rules (critical):
- Every task and subtask that survives the edit MUST keep its original 'id' exactly as it appears in the existing plan.
- Brand-new tasks and subtasks get a new unique 'id'.
- Never reuse an existing id for a new entry.

Keep the 'status' of existing tasks unless the user says otherwise. New subtasks start with 'completed' false.

Existing Plan:
{{{existing_plan_json}}}

Your final output must be a single, complete JSON object that strictly follows the output schema.

User's Transcribed Text:
{{{transcribed_text}}}
"#;

/// Single-task detail extraction prompt
pub const TASK_DETAILS: &str = r#"You are a task analysis expert. Your sole job is to extract the details of a single task from the provided text.

Transcribed Text: "{{{transcribed_text}}}"

You MUST extract the following information:
- task: What is the task?
- category: What category does it belong to (e.g. "Work", "Personal")?
- deadline: If a time or day is mentioned, extract it precisely.
- priority: Determine if the task is High, Medium, or Low priority.
- emoji: Assign a single, relevant Unicode emoji that visually represents the task. If the text contains an emoji shorthand code (like ":briefcase:" or ":tada:"), convert it to the corresponding Unicode character.

Your output must be a single JSON object that strictly follows the output schema.
"#;

/// Itinerary generation prompt: creation and update in one template
pub const ITINERARY: &str = r#"You are a travel agent AI. Create or update a detailed, day-by-day travel itinerary from the user's transcribed voice input.

Analyze the text to identify the destination, travel dates, and any planned activities, then structure the response as follows:
1. Create a descriptive 'title' for the itinerary (e.g. "Weekend Trip to Paris").
2. Extract the 'startDate' and 'endDate' from the text.
3. Group all activities into a 'days' array, one element per day of the trip.
4. For each day, set the 'day' number (starting from 1) and a 'title' for that day's theme (e.g. "Cultural Exploration").
5. List each day's 'activities' in chronological or logical order. Each activity needs a 'time' (e.g. "9:00 AM"), a 'description', and a 'type' from: 'travel', 'food', 'activity', 'lodging'.
6. Give each activity a single, relevant Unicode emoji: "✈️" for a flight, "🏛️" for a museum visit, "🍽️" for a dinner reservation, and so on.

IMPORTANT: If the transcribed text is too vague or lacks the necessary information (like dates or a clear destination) to create a plausible itinerary, you MUST NOT invent details. Instead, return an empty JSON object {}.

{{#if existing_itinerary_json}}
An existing itinerary has been provided. Update it based on the new transcribed text: add, modify, or remove activities, or change dates as requested. Keep an activity's original properties (including its 'id') unless the new text changes them. The result must be a complete, coherent itinerary with the changes incorporated.

Existing Itinerary:
{{{existing_itinerary_json}}}
{{/if}}

Your final output must be a single, complete JSON object that strictly adheres to the output schema.

Transcribed Text:
{{{transcribed_text}}}
"#;

/// Subtask augmentation prompt
pub const SUBTASKS: &str = r#"You are a personal assistant. Add subtasks to an existing task based on transcribed user input.

You are given the existing task as JSON and a transcription describing the new subtasks. Identify every individual subtask mentioned in the text.

For each new subtask:
1. Assign a unique 'id'.
2. Set 'completed' to false.
3. Append it to the task's 'subtasks' array.

If the 'subtasks' array already has items, append the new ones after them. Do not modify any other property of the existing task.

Existing Task:
{{{existing_task_json}}}

Your final output must be the single, complete, updated task object in JSON format.

Transcribed Text for Subtasks:
{{{transcribed_text}}}
"#;

/// User insights prompt
pub const INSIGHTS: &str = r#"You are a friendly and encouraging personal productivity assistant. Analyze the user's history of plans and travels and provide short, actionable, positive insights.

You MUST generate 3-5 unique insights based on the data. Focus on patterns, achievements, and gentle suggestions.
- Frame insights positively. Instead of "You are bad at finishing tasks", say "You have a few tasks in progress. Let's get them done!".
- Keep each insight concise (1-2 sentences) and give it a relevant emoji.
- Identify a productivity peak day of the week if a clear pattern exists.
- Comment on travel patterns if they exist (e.g. "You seem to love weekend trips!").
- Acknowledge achievements like completing a high number of tasks or planning several trips.

Do not make up data. If there is not enough history for a meaningful insight, provide a generic encouraging message instead.

User's Plan History:
{{{plan_history_json}}}

User's Itinerary History:
{{{itinerary_history_json}}}

Your final output must be a single JSON object that strictly adheres to the output schema.
"#;

/// Look up an embedded template by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    match name {
        "transcribe" => Some(TRANSCRIBE),
        "route-intent" => Some(ROUTE_INTENT),
        "plan-create" => Some(PLAN_CREATE),
        "plan-update" => Some(PLAN_UPDATE),
        "task-details" => Some(TASK_DETAILS),
        "itinerary" => Some(ITINERARY),
        "subtasks" => Some(SUBTASKS),
        "insights" => Some(INSIGHTS),
        _ => None,
    }
}
