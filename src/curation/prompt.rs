use super::CurationRequest;

/// Builds the instruction sent to the model for one round.
///
/// `history` is expected to be already cut to the history window.
pub fn build_prompt(request: &CurationRequest, history: &[String]) -> String {
    let energy = match request.energy.trim() {
        "" => "NEUTRAL".to_string(),
        energy => energy.to_uppercase(),
    };

    let avoid_instruction = if history.is_empty() {
        String::new()
    } else {
        format!(
            "IMPORTANT: Do NOT include these tracks again: {}.",
            history.join(", ")
        )
    };

    let reference_block = if request.reference.is_empty() {
        String::new()
    } else {
        format!(
            r#"
REFERENCE PLAYLIST (the user is expanding it):
{}
-> Match the sonic identity of these tracks. Do NOT repeat them.
"#,
            request
                .reference
                .iter()
                .map(|track| format!("- {}", track))
                .collect::<Vec<_>>()
                .join("\n")
        )
    };

    format!(
        r#"
ROLE: Expert Music Architect & Sonic Curator.
TASK: Create a playlist of {count} tracks based on the user's input.

USER INPUT: "{query}"
ENERGY PROFILE: {energy} (Apply strictly).

INPUT INTERPRETATION LOGIC (CRITICAL):
A. IF input is a GENRE/MOOD (e.g., "Acid Jazz", "Sad rainy vibe"):
   -> Generate tracks that perfectly fit that description.

B. IF input is a SPECIFIC ARTIST/SONG/ALBUM (e.g., "Cosmo", "Radiohead - OK Computer"):
   -> Treat the input as a "SEED". Generate tracks that are SONICALLY SIMILAR to the seed.
   -> Do NOT just list the artist's own top hits.
      Find similar artists/vibes from the same scene or sonic landscape.
   -> If input is a specific song, match its tempo, key, and atmosphere.
{reference}
DIVERSITY: At most {per_artist} tracks per artist.
CONTEXT: User is building a playlist. {avoid}

OUTPUT FORMAT:
Pure JSON list of objects: [{{"artist": "Name", "track": "Title"}}].
"#,
        count = request.proposal_size,
        query = request.query.trim(),
        energy = energy,
        reference = reference_block,
        per_artist = request.max_per_artist,
        avoid = avoid_instruction,
    )
}
