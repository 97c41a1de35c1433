use std::rc::Rc;

use js_sys::{Function, Reflect};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{window, Element, HtmlCanvasElement, ScrollBehavior, ScrollIntoViewOptions};
use yew::prelude::*;

use crate::content::{ContactLink, Entry, Hero, SceneOptions, SiteContent};
use crate::dom::{self, EventSubscription, RevealObserver};
use crate::motion::{reveal_style, HERO_ENTRANCE};
use crate::overlay::{NavOverlay, OverlayPhase, NAV_ITEMS};
use crate::scene::gl::{self, SceneHandle};
use crate::scene::SceneParams;
use crate::theme::{ThemeAction, ThemeMode, ThemeStore, DEFAULT_MODE};

const SECTION_REVEAL_MARGIN: &str = "-100px";
const CONTACT_REVEAL_MARGIN: &str = "0px";

impl Reducible for ThemeStore {
    type Action = ThemeAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let next = self.apply(action);
        if next != *self {
            return Rc::new(next);
        }

        if let ThemeAction::SystemChanged(mode) = action {
            if self.manually_toggled() && mode != self.current_mode() {
                log::debug!(
                    "theme.system_change ignored=true mode={} kept={}",
                    mode.as_str(),
                    self.current_mode().as_str()
                );
            }
        }
        self
    }
}

/// Shared theme cell; consumers re-render whenever the store changes.
pub type ThemeContext = UseReducerHandle<ThemeStore>;

fn load_content() -> SiteContent {
    SiteContent::embedded().unwrap_or_else(|error| {
        log::error!("content.invalid error={error}");
        SiteContent::default()
    })
}

fn apply_theme(mode: ThemeMode) {
    if let Some(root) = window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    {
        let _ = root.set_attribute("data-theme", mode.as_str());
        let _ = root.set_attribute("style", &mode.palette().css_variables());
    }
}

fn apply_theme_with_transition(mode: ThemeMode) {
    if dom::prefers_reduced_motion() {
        apply_theme(mode);
        return;
    }

    let Some(document) = window().and_then(|w| w.document()) else {
        apply_theme(mode);
        return;
    };

    let document_js: JsValue = document.into();
    let Ok(start_view_transition) =
        Reflect::get(&document_js, &JsValue::from_str("startViewTransition"))
    else {
        apply_theme(mode);
        return;
    };

    let Some(start_view_transition) = start_view_transition.dyn_ref::<Function>() else {
        apply_theme(mode);
        return;
    };

    let callback = Closure::once_into_js(move || apply_theme(mode));
    if start_view_transition.call1(&document_js, &callback).is_err() {
        apply_theme(mode);
    }
}

fn scroll_to(target: &NodeRef) {
    if let Some(element) = target.cast::<Element>() {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        element.scroll_into_view_with_scroll_into_view_options(&options);
    }
}

#[derive(Properties, PartialEq)]
struct SceneBackgroundProps {
    options: SceneOptions,
}

#[function_component(SceneBackground)]
fn scene_background(props: &SceneBackgroundProps) -> Html {
    let theme = use_context::<ThemeContext>();
    let canvas_ref = use_node_ref();
    let scene = use_mut_ref(|| None::<SceneHandle>);
    let mode = theme.map(|t| t.current_mode()).unwrap_or(DEFAULT_MODE);
    let options = props.options;

    {
        let canvas_ref = canvas_ref.clone();
        let scene = scene.clone();
        use_effect_with((), move |_| {
            if let Some(canvas) = canvas_ref.cast::<HtmlCanvasElement>() {
                match gl::mount(canvas, SceneParams::for_mode(mode, &options), options.star_count) {
                    Ok(handle) => *scene.borrow_mut() = Some(handle),
                    Err(error) => log::warn!("scene.unavailable reason={error}"),
                }
            }

            move || {
                scene.borrow_mut().take();
            }
        });
    }

    {
        let scene = scene.clone();
        use_effect_with(mode, move |mode| {
            if let Some(handle) = scene.borrow().as_ref() {
                handle.set_params(SceneParams::for_mode(*mode, &options));
            }
            || ()
        });
    }

    html! {
        <div class="scene-container" aria-hidden="true">
            <canvas ref={canvas_ref} class="scene-canvas"></canvas>
        </div>
    }
}

#[function_component(Navbar)]
fn navbar() -> Html {
    let theme = use_context::<ThemeContext>();
    let overlay = use_state_eq(NavOverlay::default);

    let on_menu = {
        let overlay = overlay.clone();
        Callback::from(move |_| {
            let mut next = *overlay;
            next.toggle();
            if dom::prefers_reduced_motion() {
                next.exit_finished();
            }
            overlay.set(next);
        })
    };

    let on_animation_end = {
        let overlay = overlay.clone();
        Callback::from(move |_| {
            let mut next = *overlay;
            next.exit_finished();
            overlay.set(next);
        })
    };

    let Some(theme) = theme else {
        return html! {};
    };
    let mode = theme.current_mode();

    let on_toggle = Callback::from(move |_| {
        log::info!("theme.toggle mode={}", mode.toggled().as_str());
        theme.dispatch(ThemeAction::Toggle);
    });

    let menu = overlay.menu();

    html! {
        <>
            <button
                class="theme-toggle"
                type="button"
                aria-label={mode.toggle_label()}
                aria-pressed={mode.is_dark().to_string()}
                onclick={on_toggle}
            >
                <span aria-hidden="true">{mode.icon()}</span>
            </button>
            <nav class="nav-container" aria-label="Sections">
                <button
                    class="menu-button"
                    type="button"
                    aria-label={menu.button_label()}
                    aria-expanded={menu.is_open().to_string()}
                    onclick={on_menu}
                >
                    {menu.button_glyph()}
                </button>
                if overlay.is_mounted() {
                    <div
                        class="nav-menu"
                        data-phase={overlay.phase().as_str()}
                        aria-hidden={(overlay.phase() == OverlayPhase::Exiting).to_string()}
                        style={overlay.panel_style()}
                        onanimationend={on_animation_end}
                    >
                        { for NAV_ITEMS.iter().map(|item| html! {
                            <a class="nav-item" href={item.href}>{item.label}</a>
                        }) }
                    </div>
                }
            </nav>
        </>
    }
}

#[derive(Properties, PartialEq)]
struct HeroSectionProps {
    hero: Hero,
    contact_ref: NodeRef,
}

#[function_component(HeroSection)]
fn hero_section(props: &HeroSectionProps) -> Html {
    let sample = use_state_eq(dom::scroll_sample);

    {
        let sample = sample.clone();
        use_effect_with((), move |_| {
            sample.set(dom::scroll_sample());
            let subscription =
                EventSubscription::on_window("scroll", true, move |_| sample.set(dom::scroll_sample()))
                    .map_err(|error| log::warn!("scroll.listen_failed error={error:?}"))
                    .ok();

            move || drop(subscription)
        });
    }

    let on_scroll_down = {
        let contact_ref = props.contact_ref.clone();
        Callback::from(move |_| scroll_to(&contact_ref))
    };

    let entrance = format!(
        "--enter-opacity: {}; --enter-y: {}px; --enter-duration: {}ms; --enter-ease: {};",
        HERO_ENTRANCE.frame.opacity,
        HERO_ENTRANCE.frame.translate_y,
        HERO_ENTRANCE.duration_ms,
        HERO_ENTRANCE.easing.css()
    );

    html! {
        <section id="about" class="hero-section">
            <div class="hero-entrance" style={entrance}>
                <div class="hero-content" style={sample.hero_params().css()}>
                    <h1 class="hero-title">{props.hero.title.clone()}</h1>
                    <p class="hero-text">{props.hero.text.clone()}</p>
                </div>
            </div>
            if sample.affordance_visible() {
                <button
                    class="scroll-down"
                    type="button"
                    aria-label="Scroll to Contact"
                    onclick={on_scroll_down}
                >
                    <svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2.5" stroke-linecap="round" stroke-linejoin="round">
                        <path d="M12 5v14M5 12l7 7 7-7" />
                    </svg>
                </button>
            }
        </section>
    }
}

#[derive(Properties, PartialEq)]
struct RevealSectionProps {
    id: AttrValue,
    class: AttrValue,
    title: AttrValue,
    list_class: AttrValue,
    margin: AttrValue,
    section_ref: NodeRef,
    #[prop_or_default]
    children: Children,
}

/// A section whose title and children fade up, staggered, while it is on screen.
#[function_component(RevealSection)]
fn reveal_section(props: &RevealSectionProps) -> Html {
    let visible = use_state_eq(dom::prefers_reduced_motion);

    {
        let visible = visible.clone();
        let section_ref = props.section_ref.clone();
        let margin = props.margin.clone();
        use_effect_with((), move |_| {
            let observer = if dom::prefers_reduced_motion() {
                None
            } else {
                section_ref.cast::<Element>().and_then(|element| {
                    RevealObserver::observe(&element, &margin, move |on_screen| visible.set(on_screen))
                        .map_err(|error| log::warn!("reveal.observe_failed error={error:?}"))
                        .ok()
                })
            };

            move || drop(observer)
        });
    }

    html! {
        <section
            id={props.id.clone()}
            class={classes!("section", props.class.to_string())}
            ref={props.section_ref.clone()}
        >
            <h2 class="section-title reveal-item" style={reveal_style(0, *visible)}>
                {props.title.clone()}
            </h2>
            <div class={props.list_class.to_string()}>
                { for props.children.iter().enumerate().map(|(index, child)| html! {
                    <div class="reveal-item" style={reveal_style(index + 1, *visible)}>{child}</div>
                }) }
            </div>
        </section>
    }
}

#[derive(Properties, PartialEq)]
struct EntryCardProps {
    entry: Entry,
}

#[function_component(EntryCard)]
fn entry_card(props: &EntryCardProps) -> Html {
    let entry = &props.entry;

    html! {
        <article class="card">
            <h3 class="card-title">{entry.title.clone()}</h3>
            <p class="card-subtitle">{entry.subtitle.clone()}</p>
            if let Some(period) = entry.period.clone() {
                <p class="card-period">{period}</p>
            }
            <p class="card-text">{entry.description.clone()}</p>
            if !entry.tags.is_empty() {
                <div class="card-tags">{entry.tags.join(", ")}</div>
            }
        </article>
    }
}

fn contact_link(link: &ContactLink) -> Html {
    html! {
        <a class="contact-link" href={link.href.clone()} target="_blank" rel="noopener noreferrer">
            {link.label.clone()}
        </a>
    }
}

#[function_component(App)]
fn app() -> Html {
    let content = use_memo((), |_| load_content());
    let policy = content.theme.follow_system;
    let theme = use_reducer(move || {
        ThemeStore::new(ThemeMode::from_prefers_dark(dom::system_prefers_dark()), policy)
    });
    let applied = use_mut_ref(|| false);
    let projects_ref = use_node_ref();
    let experience_ref = use_node_ref();
    let contact_ref = use_node_ref();
    let mode = theme.current_mode();

    use_effect_with(mode, move |mode| {
        if applied.replace(true) {
            apply_theme_with_transition(*mode);
        } else {
            apply_theme(*mode);
        }
        || ()
    });

    {
        let theme = theme.clone();
        use_effect_with((), move |_| {
            let subscription = dom::color_scheme_query().and_then(|query| {
                let list = query.clone();
                EventSubscription::listen(&query, "change", move |_| {
                    let mode = ThemeMode::from_prefers_dark(Some(list.matches()));
                    log::debug!("theme.system_change mode={}", mode.as_str());
                    theme.dispatch(ThemeAction::SystemChanged(mode));
                })
                .map_err(|error| log::warn!("theme.listen_failed error={error:?}"))
                .ok()
            });

            move || drop(subscription)
        });
    }

    html! {
        <ContextProvider<ThemeContext> context={theme.clone()}>
            <a class="skip-link" href="#content">{"Skip to main content"}</a>
            <div class={classes!("page", mode.as_str())}>
                <Navbar />
                <SceneBackground options={content.scene} />
                <main id="content" class="content">
                    <HeroSection hero={content.hero.clone()} contact_ref={contact_ref.clone()} />
                    <RevealSection
                        id="projects"
                        class="projects-section"
                        title="Projects"
                        list_class="project-grid"
                        margin={SECTION_REVEAL_MARGIN}
                        section_ref={projects_ref.clone()}
                    >
                        { for content.projects.iter().map(|entry| html! { <EntryCard entry={entry.clone()} /> }) }
                    </RevealSection>
                    <RevealSection
                        id="experience"
                        class="experience-section"
                        title="Experience"
                        list_class="experience-list"
                        margin={SECTION_REVEAL_MARGIN}
                        section_ref={experience_ref.clone()}
                    >
                        { for content.experience.iter().map(|entry| html! { <EntryCard entry={entry.clone()} /> }) }
                    </RevealSection>
                    <RevealSection
                        id="contact"
                        class="contact-section"
                        title="Get In Touch"
                        list_class="contact-links"
                        margin={CONTACT_REVEAL_MARGIN}
                        section_ref={contact_ref.clone()}
                    >
                        { for content.contact.iter().map(contact_link) }
                    </RevealSection>
                </main>
            </div>
        </ContextProvider<ThemeContext>>
    }
}

pub fn run() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);

    let Some(root) = window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("app"))
    else {
        log::error!("app.mount_failed reason=missing #app mount point");
        return;
    };

    log::info!("app.start");
    yew::Renderer::<App>::with_root(root).render();
}
