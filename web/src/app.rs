use crate::lobby;
use crate::race::{self, RaceView};
use crate::websocket::socket_url;
use leptos::prelude::*;
use leptos_router::components::{Redirect, Route, Router, Routes, A};
use leptos_router::hooks::{use_navigate, use_params_map, use_query_map};
use leptos_router::path;
use shared::bootstrap::{bootstrap, RaceTicket};
use shared::fsm::RaceState;
use web_sys::console;

fn race_path(ticket: &RaceTicket) -> String {
    let room: String = js_sys::encode_uri_component(&ticket.room_id).into();
    let name: String = js_sys::encode_uri_component(&ticket.display_name).into();
    format!("/room/{}?name={}", room, name)
}

#[component]
pub fn App() -> impl IntoView {
    view! {
        <Router>
            <main class="min-h-screen bg-gray-100 p-8">
                <Routes fallback=|| "Page not found.">
                    <Route path=path!("/") view=RoomPage/>
                    <Route path=path!("/room/:room_id") view=RacePage/>
                </Routes>
            </main>
        </Router>
    }
}

/// Room selection: collects a room id and display name, then moves on to
/// the race page. Players seen joining meanwhile are listed underneath.
#[component]
pub fn RoomPage() -> impl IntoView {
    let (room_id, set_room_id) = signal(String::new());
    let (name, set_name) = signal(String::new());
    let users = RwSignal::new(String::new());
    let navigate = use_navigate();

    if let Err(e) = lobby::watch(&socket_url(), users) {
        console::warn_1(&e.to_string().into());
    }
    on_cleanup(lobby::release);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let room = room_id.get();
        let display_name = name.get();
        match bootstrap(Some(room.as_str()), Some(display_name.as_str())) {
            Ok(ticket) => navigate(&race_path(&ticket), Default::default()),
            Err(e) => console::log_1(&e.to_string().into()),
        }
    };

    view! {
        <div class="max-w-xl mx-auto bg-white rounded-lg shadow-lg p-6">
            <h1 class="text-4xl font-bold text-center mb-8 text-blue-600">"KeyForge"</h1>
            <form class="flex flex-col gap-4" on:submit=on_submit>
                <input
                    type="text"
                    placeholder="Enter Room ID"
                    class="border rounded px-3 py-2"
                    prop:value=room_id
                    on:input=move |ev| set_room_id.set(event_target_value(&ev))
                />
                <input
                    type="text"
                    placeholder="Enter Username"
                    class="border rounded px-3 py-2"
                    prop:value=name
                    on:input=move |ev| set_name.set(event_target_value(&ev))
                />
                <button type="submit" class="bg-blue-500 text-white px-4 py-2 rounded hover:bg-blue-600">
                    "Join Room"
                </button>
            </form>
            <p class="mt-6 text-center text-gray-600">"Connected Users: " {move || users.get()}</p>
        </div>
    }
}

/// The race itself. Without both a room id and a display name the page
/// redirects to room selection and never opens a socket.
#[component]
pub fn RacePage() -> impl IntoView {
    let params = use_params_map();
    let query = use_query_map();
    let room_id = params.with_untracked(|p| p.get("room_id"));
    let name = query.with_untracked(|q| q.get("name"));

    let ticket = match bootstrap(room_id.as_deref(), name.as_deref()) {
        Ok(ticket) => ticket,
        Err(e) => {
            console::log_1(&format!("{}, back to room selection", e).into());
            return view! { <Redirect path="/"/> }.into_any();
        }
    };

    let room_label = ticket.room_id.clone();
    let state = RwSignal::new(RaceView {
        self_id: ticket.display_name.clone(),
        status: RaceState::Idle,
        paragraph: String::new(),
        typed: String::new(),
        is_correct: true,
        progress: 0.0,
        correct_len: 0,
        complete: false,
        wpm: 0,
        winner: None,
        leaderboard: Vec::new(),
        connected: false,
    });

    if let Err(e) = race::start(ticket, &socket_url(), state) {
        console::error_1(&e.to_string().into());
    }
    on_cleanup(race::release);

    let racing = move || state.with(|v| v.status == RaceState::Racing);
    let finished = move || state.with(|v| v.status == RaceState::Finished);

    view! {
        <div class="max-w-5xl mx-auto grid grid-cols-3 gap-6">
            <div class="col-span-2 bg-white rounded-lg shadow-lg p-6">
                <div class="flex justify-between items-center mb-4">
                    <div>
                        <h1 class="text-2xl font-bold text-blue-600">"Typing Race"</h1>
                        <div class="text-sm text-gray-600">
                            {move || state.with(|v| v.self_id.clone())} " • room " {room_label}
                            {move || if state.with(|v| v.connected) { " • Connected" } else { " • Disconnected" }}
                        </div>
                    </div>
                    <div class="flex gap-4 text-sm">
                        <div class="text-center">
                            <div class=move || {
                                if state.with(|v| v.is_correct) {
                                    "font-bold text-lg text-blue-600"
                                } else {
                                    "font-bold text-lg text-red-600"
                                }
                            }>
                                {move || format!("{:.0}%", state.with(|v| v.progress))}
                            </div>
                            <div class="text-gray-500">"Progress"</div>
                        </div>
                        <div class="text-center">
                            <div class="font-bold text-lg text-blue-600">{move || state.with(|v| v.wpm)}</div>
                            <div class="text-gray-500">"WPM"</div>
                        </div>
                    </div>
                </div>

                <div class="text-lg font-mono leading-relaxed p-4 bg-gray-50 rounded mb-4">
                    <Show
                        when=move || state.with(|v| !v.paragraph.is_empty())
                        fallback=|| view! { <span class="text-gray-500">"Waiting for paragraph..."</span> }
                    >
                        <span class="correct-char">
                            {move || state.with(|v| v.paragraph.chars().take(v.correct_len).collect::<String>())}
                        </span>
                        <span>
                            {move || state.with(|v| v.paragraph.chars().skip(v.correct_len).collect::<String>())}
                        </span>
                    </Show>
                </div>

                <textarea
                    class=move || {
                        state.with(|v| {
                            if v.complete {
                                "w-full h-48 p-4 border-2 rounded border-green-500"
                            } else if v.is_correct {
                                "w-full h-48 p-4 border-2 rounded border-blue-500"
                            } else {
                                "w-full h-48 p-4 border-2 rounded border-red-500"
                            }
                        })
                    }
                    placeholder="Start typing..."
                    prop:value=move || state.with(|v| v.typed.clone())
                    prop:disabled=move || !racing()
                    on:input=move |ev| race::type_text(&event_target_value(&ev))
                />
            </div>

            <div class="bg-white rounded-lg shadow-lg p-6 h-fit">
                <h2 class="text-xl font-semibold mb-4 text-center">"Leaderboard"</h2>
                <ul class="flex flex-col gap-2">
                    {move || {
                        state.with(|v| {
                            v.leaderboard
                                .iter()
                                .map(|s| {
                                    let row = format!("{:.0}% • {} WPM", s.progress, s.wpm);
                                    view! {
                                        <li class="flex justify-between bg-gray-100 rounded px-3 py-2">
                                            <span>{s.id.clone()}</span>
                                            <span>{row}</span>
                                        </li>
                                    }
                                })
                                .collect::<Vec<_>>()
                        })
                    }}
                </ul>
            </div>

            <Show when=finished>
                <div class="col-span-3 bg-white rounded-lg shadow-lg p-6 text-center">
                    <h2 class="text-2xl font-semibold mb-4">"Race Complete!"</h2>
                    <div class="text-xl mb-6">{move || state.with(|v| v.winner_line())}</div>
                    <div class="flex gap-4 justify-center">
                        <button
                            class="bg-green-500 text-white px-4 py-2 rounded hover:bg-green-600"
                            on:click=move |_| race::play_again()
                        >
                            "Play Again"
                        </button>
                        <A href="/">"Return Home"</A>
                    </div>
                </div>
            </Show>
        </div>
    }
    .into_any()
}
