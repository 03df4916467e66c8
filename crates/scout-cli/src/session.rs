use anyhow::Result;
use scout::agent::Agent;
use scout::models::event::AgentEvent;
use scout::session::ChatSession;
use scout::turn::run_turn;

use crate::prompt::{InputType, Prompt};

#[cfg(test)]
mod mock_provider;

pub struct Session<'a> {
    agent: Agent,
    chat: ChatSession,
    prompt: Box<dyn Prompt + 'a>,
}

impl<'a> Session<'a> {
    pub fn new(agent: Agent, prompt: Box<dyn Prompt + 'a>) -> Self {
        Session {
            agent,
            chat: ChatSession::new(),
            prompt,
        }
    }

    pub async fn start(&mut self) -> Result<()> {
        if let Some(greeting) = self.chat.last() {
            let greeting = greeting.content.clone();
            self.prompt.greet(&greeting);
        }

        loop {
            let input = self.prompt.get_input()?;
            let content = match input.input_type {
                InputType::Message => match input.content {
                    Some(content) => content,
                    None => continue,
                },
                InputType::Exit => break,
                InputType::AskAgain => continue,
            };

            self.prompt.show_busy();
            self.process_turn(&content).await;
            self.prompt.hide_busy();
        }

        self.prompt.close();
        Ok(())
    }

    #[cfg(test)]
    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    /// Run one turn; failures are shown and the session carries on
    async fn process_turn(&mut self, content: &str) {
        let Session {
            agent,
            chat,
            prompt,
        } = self;

        let outcome = tokio::select! {
            result = run_turn(chat, agent, content, |event: &AgentEvent| prompt.render_event(event)) => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        };

        match outcome {
            Some(Ok(_)) => {}
            Some(Err(e)) => prompt.render_error(&e.to_string()),
            None => prompt.render_error("Interrupted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock_provider::MockProvider;
    use super::*;
    use crate::prompt::Input;
    use scout::models::message::Message;
    use scout::session::{ChatEntry, GREETING};
    use scout::tools::Toolbox;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays scripted input and records what would have been shown
    struct MockPrompt {
        inputs: VecDeque<Input>,
        shown: Arc<Mutex<Vec<String>>>,
    }

    impl MockPrompt {
        fn new(inputs: Vec<Input>) -> (Self, Arc<Mutex<Vec<String>>>) {
            let shown = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    inputs: inputs.into(),
                    shown: shown.clone(),
                },
                shown,
            )
        }

        fn show(&self, line: String) {
            self.shown.lock().unwrap().push(line);
        }
    }

    impl Prompt for MockPrompt {
        fn greet(&mut self, greeting: &str) {
            self.show(format!("greeting: {}", greeting));
        }

        fn render_event(&mut self, event: &AgentEvent) {
            if let AgentEvent::FinalAnswer { text } = event {
                self.show(format!("answer: {}", text));
            } else {
                self.show(event.kind().to_string());
            }
        }

        fn render_error(&mut self, error: &str) {
            self.show(format!("error: {}", error));
        }

        fn get_input(&mut self) -> Result<Input> {
            Ok(self.inputs.pop_front().unwrap_or_else(Input::exit))
        }

        fn show_busy(&mut self) {}

        fn hide_busy(&mut self) {}

        fn close(&self) {}
    }

    fn agent(responses: Vec<Result<Message, String>>) -> Agent {
        Agent::new(Box::new(MockProvider::new(responses)), Toolbox::new())
    }

    #[tokio::test]
    async fn test_turns_are_recorded() {
        let (prompt, shown) = MockPrompt::new(vec![
            Input::message("What is 2+2?"),
            Input::message("thanks"),
            Input::exit(),
        ]);
        let mut session = Session::new(
            agent(vec![
                Ok(Message::assistant().with_text("4")),
                Ok(Message::assistant().with_text("You're welcome!")),
            ]),
            Box::new(prompt),
        );

        session.start().await.unwrap();

        assert_eq!(session.chat().len(), 5);
        assert_eq!(session.chat().entries()[1], ChatEntry::user("What is 2+2?"));
        assert_eq!(session.chat().entries()[2], ChatEntry::assistant("4"));
        assert_eq!(
            *shown.lock().unwrap(),
            vec![
                format!("greeting: {}", GREETING),
                "answer: 4".to_string(),
                "answer: You're welcome!".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_error_does_not_end_session() {
        let (prompt, shown) = MockPrompt::new(vec![
            Input::message("first"),
            Input::ask_again(),
            Input::message("second"),
        ]);
        let mut session = Session::new(
            agent(vec![
                Err("Server error: 503 Service Unavailable".to_string()),
                Ok(Message::assistant().with_text("back again")),
            ]),
            Box::new(prompt),
        );

        session.start().await.unwrap();

        let shown = shown.lock().unwrap();
        assert_eq!(shown[1], "error: Server error: 503 Service Unavailable");
        assert_eq!(shown[2], "answer: back again");
        // greeting, failed prompt, then a full turn
        assert_eq!(session.chat().len(), 4);
        assert_eq!(session.chat().entries()[1], ChatEntry::user("first"));
    }
}
